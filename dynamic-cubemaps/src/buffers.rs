mod bind_group;
mod bindable;
mod cube_texture;
mod sampler;
mod uniform_buffer;

pub use self::bind_group::*;
pub use self::bindable::*;
pub use self::cube_texture::*;
pub use self::sampler::*;
pub use self::uniform_buffer::*;
