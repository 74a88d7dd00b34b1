use engine::RasterFrame;
use iced::widget::{Space, image};
use iced::{ContentFit, Element, Length};

/// UI-ready raster image converted from an engine frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub handle: image::Handle,
    pub width: u32,
    pub height: u32,
    pub generation: u64,
}

impl RasterImage {
    /// Converts an RGBA frame into an iced image handle.
    pub fn from_frame(generation: u64, frame: &RasterFrame) -> Option<Self> {
        let expected_bytes = frame.width.checked_mul(frame.height)?.checked_mul(4)? as usize;
        if frame.bytes.len() != expected_bytes {
            return None;
        }

        Some(Self {
            handle: image::Handle::from_rgba(frame.width, frame.height, frame.bytes.to_vec()),
            width: frame.width,
            height: frame.height,
            generation,
        })
    }
}

/// State of the still-image surface.
///
/// The last drawn frame stays visible until a newer one replaces it or the
/// surface is cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterSurface {
    latest: Option<RasterImage>,
}

impl RasterSurface {
    /// Shows `frame`. Malformed frames leave the surface unchanged.
    pub fn show(&mut self, generation: u64, frame: &RasterFrame) {
        if let Some(image) = RasterImage::from_frame(generation, frame) {
            self.latest = Some(image);
        }
    }

    pub fn clear(&mut self) {
        self.latest = None;
    }

    pub fn latest(&self) -> Option<&RasterImage> {
        self.latest.as_ref()
    }
}

/// Renders the surface at exactly the drawn frame's size.
pub fn view<'a, Message>(surface: &RasterSurface) -> Element<'a, Message>
where
    Message: 'a,
{
    match surface.latest() {
        Some(raster) => image(raster.handle.clone())
            .content_fit(ContentFit::Fill)
            .width(Length::Fixed(raster.width as f32))
            .height(Length::Fixed(raster.height as f32))
            .into(),
        None => Space::new(Length::Shrink, Length::Shrink).into(),
    }
}
