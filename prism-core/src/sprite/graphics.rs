//! `embedded-graphics` drawing into sprites

use core::convert::Infallible;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::Pixel;

use super::Sprite;
use crate::color::{ColorConverter, PixelFormat};
use crate::geometry::Rect;
use crate::traits::Surface;

impl Sprite {
    fn raw_from_rgb565(&self, color: Rgb565) -> u32 {
        let value = color.into_storage() as u32;
        if self.format == PixelFormat::RGB565 {
            return value;
        }
        ColorConverter::new(PixelFormat::RGB565, self.format)
            .with_palettes(None, self.palette.as_ref())
            .convert(value)
    }
}

impl OriginDimensions for Sprite {
    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}

impl DrawTarget for Sprite {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let raw = self.raw_from_rgb565(color);
            self.set_pixel(point.x, point.y, raw);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let raw = self.raw_from_rgb565(color);
        let area = Rect::new(
            area.top_left.x,
            area.top_left.y,
            area.size.width as i32,
            area.size.height as i32,
        )
        .intersect(&self.clip);
        if !area.is_empty() {
            // Sprite writes cannot fail
            let _ = self.fill_area(area, raw);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::RgbColor;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_draw_rectangle_primitive() {
        let mut s = Sprite::new(10, 10, PixelFormat::RGB565).unwrap();
        Rectangle::new(Point::new(2, 3), Size::new(4, 2))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::RED))
            .draw(&mut s)
            .unwrap();
        assert_eq!(s.get_pixel(2, 3), Some(0xF800));
        assert_eq!(s.get_pixel(5, 4), Some(0xF800));
        assert_eq!(s.get_pixel(6, 4), Some(0));
    }

    #[test]
    fn test_draw_converts_to_native_format() {
        let mut s = Sprite::new(4, 4, PixelFormat::RGB888).unwrap();
        Pixel(Point::new(1, 1), Rgb565::BLUE).draw(&mut s).unwrap();
        // Out of bounds points are dropped
        Pixel(Point::new(-1, 9), Rgb565::BLUE).draw(&mut s).unwrap();
        assert_eq!(s.get_pixel(1, 1), Some(0x0000F8));
        assert_eq!(s.size(), Size::new(4, 4));
    }
}
