use anyhow::Context as _;

use crate::data_structures::texture::{self, decode_image};

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("no origin: {e:?}"))?;
    let base = reqwest::Url::parse(&format!("{origin}/assets/"))?;
    Ok(base.join(file_name)?)
}

/// Read an asset. Natively from `./assets`, on the web from `<origin>/assets/`.
pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        let response = reqwest::get(url).await?.error_for_status()?;
        response.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        std::fs::read(&path).with_context(|| format!("cannot read {}", path.display()))?
    };

    Ok(data)
}

fn extension(file_name: &str) -> Option<&str> {
    file_name.rsplit_once('.').map(|(_, ext)| ext.trim())
}

/// Load and decode an image without uploading it.
pub async fn load_image(file_name: &str) -> anyhow::Result<image::DynamicImage> {
    let data = load_binary(file_name).await?;
    decode_image(&data, extension(file_name)).with_context(|| format!("cannot decode {file_name}"))
}

pub async fn load_texture(
    file_name: &str,
    linear: bool,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<texture::Texture> {
    let img = load_image(file_name).await?;
    Ok(texture::Texture::from_image(
        device,
        queue,
        &img,
        Some(file_name),
        linear,
    ))
}
