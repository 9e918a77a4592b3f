/// The pixel buffer the images are blitted into, owned by the renderer.
pub mod surface;
/// basic geometry shared by the images and the surface
pub mod types;
