/// File name for the merged environment mesh
pub const MERGED_MESH_FILE_NAME: &str = "environment_mesh.obj";

/// Sub directory receiving one OBJ file per instance
pub const INSTANCE_DIR_NAME: &str = "instances";

/// Header comment written at the top of every exported OBJ file
pub const OBJ_HEADER: &str = "# environment mesh export";
