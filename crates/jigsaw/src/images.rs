use bevy::color::ColorToPacked;
use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use crate::puzzle::ImageSize;

pub struct CatalogEntry {
    pub name: &'static str,
    pub handle: Handle<Image>,
    pub size: ImageSize,
}

/// Pictures the player can choose from, in display order.
#[derive(Resource, Default)]
pub struct ImageCatalog {
    entries: Vec<CatalogEntry>,
}

impl ImageCatalog {
    /// Adds an already loaded image. Its pixel size has to be known up front.
    pub fn push(&mut self, name: &'static str, handle: Handle<Image>, size: ImageSize) {
        self.entries.push(CatalogEntry { name, handle, size });
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }
}

/// Color at normalized image coordinates, `v` grows downwards.
type Paint = fn(f32, f32) -> Color;

struct Pattern {
    name: &'static str,
    width: u32,
    height: u32,
    paint: Paint,
}

const PATTERNS: [Pattern; 3] = [
    Pattern {
        name: "Sunset",
        width: 800,
        height: 600,
        paint: sunset,
    },
    Pattern {
        name: "Ribbons",
        width: 600,
        height: 900,
        paint: ribbons,
    },
    Pattern {
        name: "Quilt",
        width: 640,
        height: 640,
        paint: quilt,
    },
];

pub struct ImagesPlugin;

impl Plugin for ImagesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ImageCatalog>()
            .add_systems(Startup, generate_images);
    }
}

fn generate_images(mut catalog: ResMut<ImageCatalog>, mut images: ResMut<Assets<Image>>) {
    for pattern in &PATTERNS {
        let image = render_pattern(pattern);
        catalog.push(
            pattern.name,
            images.add(image),
            ImageSize::new(pattern.width, pattern.height),
        );
    }
    info!("Generated {} puzzle images", PATTERNS.len());
}

fn render_pattern(pattern: &Pattern) -> Image {
    let (width, height) = (pattern.width, pattern.height);
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        let v = (y as f32 + 0.5) / height as f32;
        for x in 0..width {
            let u = (x as f32 + 0.5) / width as f32;
            data.extend_from_slice(&(pattern.paint)(u, v).to_srgba().to_u8_array());
        }
    }

    Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

fn sunset(u: f32, v: f32) -> Color {
    let sun = Vec2::new(u - 0.65, (v - 0.55) * 0.75).length();
    let hills = 0.05f32.mul_add((u * 9.0).sin(), 0.72);
    if v > hills {
        Color::hsl(150.0 - 40.0 * v, 0.45, 0.18 + 0.1 * (1.0 - v))
    } else if sun < 0.12 {
        Color::hsl(48.0, 1.0, 0.65)
    } else {
        Color::hsl(280.0f32.mul_add(1.0 - v, 20.0) % 360.0, 0.7, 0.55)
    }
}

fn ribbons(u: f32, v: f32) -> Color {
    let band = ((u + v * 0.6) * 8.0).floor();
    let shade = if (u * 40.0 + v * 24.0).sin() > 0.0 { 0.5 } else { 0.62 };
    Color::hsl((band * 47.0 + v * 60.0) % 360.0, 0.75, shade)
}

fn quilt(u: f32, v: f32) -> Color {
    let (col, row) = ((u * 6.0).floor(), (v * 6.0).floor());
    let dark = (col + row) as u32 % 2 == 0;
    let hue = (col * 30.0 + row * 50.0) % 360.0;
    Color::hsl(hue, 0.6, if dark { 0.35 } else { 0.7 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_fill_every_pixel() {
        let pattern = Pattern {
            name: "Tiny",
            width: 3,
            height: 2,
            paint: quilt,
        };
        let image = render_pattern(&pattern);
        assert_eq!(image.data.len(), 3 * 2 * 4);
        assert_eq!(image.size(), UVec2::new(3, 2));
    }

    #[test]
    fn catalog_covers_every_orientation() {
        let sizes: Vec<_> = PATTERNS
            .iter()
            .map(|pattern| ImageSize::new(pattern.width, pattern.height))
            .collect();
        assert!(sizes.iter().any(|size| size.width > size.height));
        assert!(sizes.iter().any(|size| size.is_portrait()));
        assert!(sizes.iter().any(|size| size.width == size.height));
    }
}
