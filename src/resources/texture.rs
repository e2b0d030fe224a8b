//! Skybox texture loading and upload

use crate::backend::traits::*;
use crate::backend::types::*;
use image::{DynamicImage, GenericImageView};
use std::path::Path;
use thiserror::Error;

/// Error while decoding a texture
#[derive(Error, Debug)]
pub enum TextureLoadError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Image {name} has zero extent")]
    Empty { name: String },
}

/// Decoded texture data, tightly packed RGBA8
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Vec<u8>,
    pub name: String,
}

impl TextureData {
    /// Load texture from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureLoadError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let img = image::open(path)?;
        Self::from_image(img, &name)
    }

    /// Load texture from encoded bytes
    pub fn from_bytes(bytes: &[u8], name: &str) -> Result<Self, TextureLoadError> {
        let img = image::load_from_memory(bytes)?;
        Self::from_image(img, name)
    }

    fn from_image(img: DynamicImage, name: &str) -> Result<Self, TextureLoadError> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureLoadError::Empty {
                name: name.to_string(),
            });
        }

        Ok(Self {
            width,
            height,
            format: TextureFormat::Rgba8UnormSrgb,
            data: img.to_rgba8().into_raw(),
            name: name.to_string(),
        })
    }

    /// Create a solid color texture
    pub fn solid_color(color: [u8; 4], name: &str) -> Self {
        Self {
            width: 1,
            height: 1,
            format: TextureFormat::Rgba8UnormSrgb,
            data: color.to_vec(),
            name: name.to_string(),
        }
    }

    /// Create a default black texture
    pub fn black() -> Self {
        Self::solid_color([0, 0, 0, 255], "black")
    }
}

/// Create a sampled texture on the device and fill it with `data`.
pub fn upload_texture<D: RenderDevice + ?Sized>(
    device: &mut D,
    data: &TextureData,
) -> BackendResult<TextureHandle> {
    let handle = device.create_texture(&TextureDescriptor {
        label: Some(data.name.clone()),
        width: data.width,
        height: data.height,
        format: data.format,
        usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
    })?;
    device.write_texture(handle, &data.data, data.width, data.height);

    log::debug!(
        "Uploaded texture {} ({}x{})",
        data.name,
        data.width,
        data.height
    );
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;

    fn encode_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(color));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
        bytes
    }

    #[test]
    fn test_from_bytes_decodes_png() {
        let bytes = encode_png(4, 2, [255, 0, 0, 255]);
        let texture = TextureData::from_bytes(&bytes, "sky").unwrap();
        assert_eq!((texture.width, texture.height), (4, 2));
        assert_eq!(texture.data.len(), 4 * 2 * 4);
        assert_eq!(&texture.data[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let result = TextureData::from_bytes(b"not an image", "broken");
        assert!(matches!(result, Err(TextureLoadError::Decode(_))));
    }

    #[test]
    fn test_upload_texture() {
        let mut device = DummyBackend::new(8, 8);
        let handle = upload_texture(&mut device, &TextureData::solid_color([255, 255, 255, 255], "white")).unwrap();
        assert_eq!(device.texture_size(handle), Some((1, 1)));
        assert_eq!(device.texture_pixels(handle).unwrap()[0], [1.0; 4]);
    }
}
