// THEORY:
// The `Pixel` module is the smallest unit the heatmap ever looks at. Each block of
// the grid is represented by exactly one sample pixel, so the whole temporal signal
// of a block is the sequence of `Pixel`s read at that location, frame after frame.
//
// Key architectural principles:
// 1.  **Dumb Container**: A `Pixel` holds three 8-bit channels and nothing else. It
//     has no knowledge of where it came from or of any other frame.
// 2.  **Single Brightness Measure**: The only heuristic computed here is
//     `brightness`, the rounded arithmetic mean of the three channels. Every block
//     series is built from this one number, so it must stay identical between the
//     sequential and parallel scans.

pub mod pixel {
    pub type Channel = u8;
    pub type Brightness = u8;

    const CHANNELS: usize = 3;

    /// A "dumb" data container representing a single RGB pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Self { red, green, blue }
        }

        /// Mean of the three channels, rounded half away from zero.
        pub fn brightness(&self) -> Brightness {
            let sum = self.red as f64 + self.green as f64 + self.blue as f64;
            (sum / CHANNELS as f64).round() as Brightness
        }
    }

    impl From<image::Rgb<u8>> for Pixel {
        fn from(rgb: image::Rgb<u8>) -> Self {
            let [red, green, blue] = rgb.0;
            Self::new(red, green, blue)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn brightness_of_gray_is_the_gray_level() {
            assert_eq!(Pixel::new(100, 100, 100).brightness(), 100);
            assert_eq!(Pixel::new(0, 0, 0).brightness(), 0);
            assert_eq!(Pixel::new(255, 255, 255).brightness(), 255);
        }

        #[test]
        fn brightness_rounds_to_nearest() {
            // 301 / 3 = 100.33
            assert_eq!(Pixel::new(100, 100, 101).brightness(), 100);
            // 302 / 3 = 100.67
            assert_eq!(Pixel::new(100, 101, 101).brightness(), 101);
        }

        #[test]
        fn from_rgb_keeps_channel_order() {
            assert_eq!(Pixel::from(image::Rgb([1, 2, 3])), Pixel::new(1, 2, 3));
        }
    }
}
