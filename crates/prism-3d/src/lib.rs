pub mod depth;
pub mod mesh;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod shadow;

pub use depth::{DEPTH_FORMAT, MSAA_SAMPLES, create_depth, create_msaa_target};
pub use mesh::{MeshData, Vertex, build_mesh};
pub use model::{GpuMesh, GpuObject, LightsUniform, ObjectUniform, create_object_ubo};
pub use pipeline::{Layouts, create_bind_group_layouts, create_pipeline, create_shadow_pipeline};
pub use render::Renderer3D;
pub use shadow::{ShadowMap, light_view_proj};
