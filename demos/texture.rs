//! Walks through the life of a shared texture.
//!
//! Run with `RUST_LOG=trace` to watch the implementation objects being released.

use implshare::RcHandleA;
use log::info;

#[derive(Debug)]
struct TextureData {
    id: u32,
    width: u32,
    height: u32,
}

impl Drop for TextureData {
    fn drop(&mut self) {
        info!("texture {} freed", self.id);
    }
}

#[derive(Clone, Default)]
struct Texture {
    data: RcHandleA<TextureData>,
}

impl Texture {
    fn load(id: u32, width: u32, height: u32) -> Self {
        info!("texture {} loaded ({}x{})", id, width, height);
        Self {
            data: RcHandleA::new(TextureData { id, width, height }),
        }
    }

    fn is_loaded(&self) -> bool {
        self.data.is_valid()
    }

    fn size(&self) -> Option<(u32, u32)> {
        self.data.with(|data| (data.width, data.height)).ok()
    }
}

fn atlas() -> Vec<Texture> {
    let grass = Texture::load(1, 32, 32);
    let stone = Texture::load(2, 64, 64);
    vec![grass.clone(), stone, grass]
}

fn main() {
    env_logger::init();

    let mut current = Texture::default();
    info!("default texture loaded: {}", current.is_loaded());

    let textures = atlas();
    current.data.assign(&textures[1].data);
    info!(
        "current texture size {:?}, shared by {} handles",
        current.size(),
        current.data.strong_count()
    );

    drop(textures);
    info!("atlas dropped, current still {:?}", current.data);

    current.data.reset();
    info!("default texture loaded: {}", current.is_loaded());
}
