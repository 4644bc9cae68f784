//! Procedurally generated sprite textures
//!
//! Small RGBA8 pixel-art images built in code, so there is no asset pipeline.
//! Row 0 is the top of the image.

/// RGBA8 image ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub type Rgba = [u8; 4];

const TRANSPARENT: Rgba = [0, 0, 0, 0];
const SKY_TOP: Rgba = [78, 192, 202, 255];
const SKY_BOTTOM: Rgba = [160, 226, 236, 255];
const CLOUD: Rgba = [234, 252, 250, 255];
const CITY: Rgba = [142, 214, 156, 255];
const GROUND: Rgba = [222, 216, 148, 255];
const PIPE_DARK: Rgba = [84, 128, 36, 255];
const PIPE_MID: Rgba = [116, 190, 46, 255];
const PIPE_LIGHT: Rgba = [158, 228, 86, 255];
const PIPE_OUTLINE: Rgba = [44, 60, 28, 255];
const BIRD_BODY: Rgba = [248, 196, 40, 255];
const BIRD_WING: Rgba = [252, 238, 190, 255];
const BIRD_BEAK: Rgba = [240, 96, 40, 255];
const BIRD_EYE: Rgba = [255, 255, 255, 255];
const BIRD_PUPIL: Rgba = [20, 20, 20, 255];

impl TextureImage {
    /// Build an image by evaluating `shade` at every pixel
    pub fn from_fn(width: u32, height: u32, shade: impl Fn(u32, u32) -> Rgba) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&shade(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Byte length a valid image of this size must have
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    #[cfg(test)]
    fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Same image upside down
    pub fn flipped_vertically(&self) -> Self {
        let row = (self.width * 4) as usize;
        let pixels = self
            .pixels
            .chunks_exact(row)
            .rev()
            .flatten()
            .copied()
            .collect();
        Self {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

fn lerp_color(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let mix = |i: usize| (a[i] as f32 + (b[i] as f32 - a[i] as f32) * t).round() as u8;
    [mix(0), mix(1), mix(2), mix(3)]
}

/// Sky with clouds, a skyline band and ground; tiles horizontally
pub fn background() -> TextureImage {
    const W: u32 = 36;
    const H: u32 = 72;
    TextureImage::from_fn(W, H, |x, y| {
        if y >= H - 8 {
            return GROUND;
        }
        // Skyline bumps repeat every 12 pixels so tiles join seamlessly
        let skyline = H - 16 - [0, 3, 3, 6, 6, 2, 2, 5, 5, 1, 1, 0][(x % 12) as usize];
        if y >= skyline {
            return CITY;
        }
        let cloud_line = 40 + [0, 1, 2, 2, 1, 0][(x % 6) as usize];
        if y >= cloud_line && y < cloud_line + 4 {
            return CLOUD;
        }
        lerp_color(SKY_TOP, SKY_BOTTOM, y as f32 / H as f32)
    })
}

/// Bird facing right
pub fn bird() -> TextureImage {
    const W: u32 = 17;
    const H: u32 = 12;
    TextureImage::from_fn(W, H, |x, y| {
        let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
        // Eye, upper right
        let (ex, ey) = (fx - 11.5, fy - 3.5);
        if ex * ex + ey * ey <= 5.0 {
            return if (12..14).contains(&x) && (3..5).contains(&y) {
                BIRD_PUPIL
            } else {
                BIRD_EYE
            };
        }
        // Beak
        if x >= 13 && (6..9).contains(&y) {
            return BIRD_BEAK;
        }
        // Body ellipse
        let (bx, by) = ((fx - 7.5) / 7.0, (fy - 6.0) / 5.5);
        if bx * bx + by * by <= 1.0 {
            // Wing
            let (wx, wy) = ((fx - 4.5) / 3.0, (fy - 6.5) / 2.0);
            if wx * wx + wy * wy <= 1.0 {
                return BIRD_WING;
            }
            return BIRD_BODY;
        }
        TRANSPARENT
    })
}

/// Pipe opening at the bottom edge (hangs from the top of the screen)
pub fn pipe_top() -> TextureImage {
    pipe_bottom().flipped_vertically()
}

/// Pipe opening at the top edge (rises from the bottom of the screen)
pub fn pipe_bottom() -> TextureImage {
    const W: u32 = 16;
    const H: u32 = 128;
    const LIP: u32 = 8;
    TextureImage::from_fn(W, H, |x, y| {
        let in_lip = y < LIP;
        // Shaft is inset by one pixel on each side
        if !in_lip && (x == 0 || x == W - 1) {
            return TRANSPARENT;
        }
        let (left, right) = if in_lip { (0, W - 1) } else { (1, W - 2) };
        if x == left || x == right || y == 0 || y == LIP - 1 {
            return PIPE_OUTLINE;
        }
        match (x - left) * 4 / (right - left) {
            0 => PIPE_LIGHT,
            1 | 2 => PIPE_MID,
            _ => PIPE_DARK,
        }
    })
}
