use crate::core::{
    constants::{FAR_PLANE, NEAR_PLANE, SPHERE_RADIUS},
    geo::{LatLong, Point},
    view_state::CameraPosition,
};
use crate::{GlobeError, Result};
use nalgebra::{Matrix4, Point3, Vector3};

/// Geometry of the rendered globe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vector3<f64>,
    pub radius: f64,
}

impl Sphere {
    /// The unit globe centered at the origin
    pub fn unit() -> Self {
        Self {
            center: Vector3::zeros(),
            radius: SPHERE_RADIUS,
        }
    }

    /// Outward unit normal at a geographic point.
    ///
    /// Longitude 0 faces +z, north is +y and east is +x.
    pub fn surface_normal(lat_long: &LatLong) -> Vector3<f64> {
        let lat = lat_long.latitude.value().to_radians();
        let lon = lat_long.longitude.value().to_radians();
        Vector3::new(lat.cos() * lon.sin(), lat.sin(), lat.cos() * lon.cos())
    }

    /// Unit tangent pointing north at a geographic point, defined at the poles too
    pub fn north_tangent(lat_long: &LatLong) -> Vector3<f64> {
        let lat = lat_long.latitude.value().to_radians();
        let lon = lat_long.longitude.value().to_radians();
        Vector3::new(-lat.sin() * lon.sin(), lat.cos(), -lat.sin() * lon.cos())
    }

    pub fn surface_point(&self, lat_long: &LatLong) -> Point3<f64> {
        Point3::from(self.center + Self::surface_normal(lat_long) * self.radius)
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::unit()
    }
}

/// View and projection matrices for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewProjection {
    pub view: Matrix4<f64>,
    pub projection: Matrix4<f64>,
}

impl ViewProjection {
    pub fn combined(&self) -> Matrix4<f64> {
        self.projection * self.view
    }

    /// Projects a world point into normalized device coordinates.
    ///
    /// Returns `None` for points behind the eye.
    pub fn project(&self, world: &Point3<f64>) -> Option<Point> {
        let clip = self.combined() * world.to_homogeneous();
        if clip.w <= f64::EPSILON {
            return None;
        }
        Some(Point::new(clip.x / clip.w, clip.y / clip.w))
    }

    /// Column-major `f32` layout for uniform upload
    pub fn view_array(&self) -> [[f32; 4]; 4] {
        to_gpu_matrix(&self.view)
    }

    pub fn projection_array(&self) -> [[f32; 4]; 4] {
        to_gpu_matrix(&self.projection)
    }
}

pub(crate) fn to_gpu_matrix(matrix: &Matrix4<f64>) -> [[f32; 4]; 4] {
    let single: Matrix4<f32> = matrix.cast();
    single.into()
}

/// Perspective camera orbiting the globe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraModel {
    position: CameraPosition,
    sphere: Sphere,
}

impl CameraModel {
    pub fn new(position: CameraPosition) -> Self {
        Self {
            position,
            sphere: Sphere::unit(),
        }
    }

    pub fn position(&self) -> &CameraPosition {
        &self.position
    }

    pub fn set_position(&mut self, position: CameraPosition) {
        self.position = position;
    }

    pub fn sphere(&self) -> &Sphere {
        &self.sphere
    }

    /// Eye location: above the camera's lat/long, `zoom` away from the globe center
    pub fn eye(&self) -> Point3<f64> {
        Point3::from(
            self.sphere.center + Sphere::surface_normal(&self.position.lat_long) * self.position.zoom,
        )
    }

    /// Derives the view and projection matrices for a viewport aspect ratio.
    ///
    /// A non-positive aspect ratio, a field of view outside (0, 180) or a
    /// non-positive zoom is a caller bug and is rejected outright.
    pub fn view_projection(&self, aspect_ratio: f64) -> Result<ViewProjection> {
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return Err(GlobeError::InvalidCamera(format!(
                "aspect ratio must be positive, got {aspect_ratio}"
            )));
        }
        let fov = self.position.field_of_view;
        if !fov.is_finite() || fov <= 0.0 || fov >= 180.0 {
            return Err(GlobeError::InvalidCamera(format!(
                "field of view must be within (0, 180) degrees, got {fov}"
            )));
        }
        let zoom = self.position.zoom;
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(GlobeError::InvalidCamera(format!(
                "zoom must be positive, got {zoom}"
            )));
        }

        let perspective = Matrix4::new_perspective(aspect_ratio, fov.to_radians(), NEAR_PLANE, FAR_PLANE);
        // Shift in clip space so the globe center lands `vertical_bias` down the viewport
        let bias_offset = 1.0 - 2.0 * self.position.vertical_bias;
        let projection = Matrix4::new_translation(&Vector3::new(0.0, bias_offset, 0.0)) * perspective;

        let target = Point3::from(self.sphere.center);
        let up = Sphere::north_tangent(&self.position.lat_long);
        let view = Matrix4::look_at_rh(&self.eye(), &target, &up);

        Ok(ViewProjection { view, projection })
    }

    /// True when the point lies on the hemisphere visible from the eye
    pub fn is_facing_camera(&self, lat_long: &LatLong) -> bool {
        let surface = self.sphere.surface_point(lat_long);
        let normal = Sphere::surface_normal(lat_long);
        normal.dot(&(self.eye() - surface)) > 0.0
    }

    /// Projects a geographic point into normalized device coordinates.
    ///
    /// Points on the far side of the globe yield `None`.
    pub fn project(&self, lat_long: &LatLong, view_projection: &ViewProjection) -> Option<Point> {
        if !self.is_facing_camera(lat_long) {
            return None;
        }
        view_projection.project(&self.sphere.surface_point(lat_long))
    }

    /// [`CameraModel::project`] for a single point; `None` also for an invalid camera
    pub fn project_for_aspect(&self, lat_long: &LatLong, aspect_ratio: f64) -> Option<Point> {
        let view_projection = self.view_projection(aspect_ratio).ok()?;
        self.project(lat_long, &view_projection)
    }
}

impl Default for CameraModel {
    fn default() -> Self {
        Self::new(CameraPosition::default())
    }
}

/// Converts a pixel position inside a viewport of `size` pixels to normalized
/// device coordinates (y up, both axes in [-1, 1])
pub fn screen_to_ndc(screen: Point, size: Point) -> Point {
    Point::new(2.0 * screen.x / size.x - 1.0, 1.0 - 2.0 * screen.y / size.y)
}

/// Inverse of [`screen_to_ndc`]
pub fn ndc_to_screen(ndc: Point, size: Point) -> Point {
    Point::new((ndc.x + 1.0) * 0.5 * size.x, (1.0 - ndc.y) * 0.5 * size.y)
}
