// Per-pixel frame transforms for the filter submenu, plus the horizontal
// mirror that gives the selfie view. Each filter rewrites the frame in
// place; dimensions never change.

use crate::types::FrameBuffer;

/// The selectable filters. `Filters` mode itself is just the submenu and
/// applies none of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    Gray,
    Hsv,
    Hls,
    Cartoon,
    HistEq,
    Blurry,
}

impl Filter {
    pub fn label(self) -> &'static str {
        match self {
            Filter::Gray => "gray",
            Filter::Hsv => "hsv",
            Filter::Hls => "hls",
            Filter::Cartoon => "cartoon",
            Filter::HistEq => "histeq",
            Filter::Blurry => "blurry",
        }
    }
}

pub fn apply(filter: Filter, fb: &mut FrameBuffer) {
    match filter {
        Filter::Gray => grayscale(fb),
        Filter::Hsv => hsv(fb),
        Filter::Hls => hls(fb),
        Filter::Cartoon => cartoon(fb),
        Filter::HistEq => hist_equalize(fb),
        Filter::Blurry => median_blur(fb, 3), // 7x7 window
    }
}

/// Flip every row so the window behaves like a mirror.
/// Visual: moving your hand left moves it left on screen too.
pub fn mirror(fb: &mut FrameBuffer) {
    for row in fb.pixels.chunks_exact_mut(fb.width) {
        row.reverse();
    }
}

#[inline]
fn unpack(px: u32) -> (u8, u8, u8) {
    (((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
}

#[inline]
fn pack(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8
}

fn gray_plane(fb: &FrameBuffer) -> Vec<u8> {
    fb.pixels
        .iter()
        .map(|&px| {
            let (r, g, b) = unpack(px);
            luma(r, g, b)
        })
        .collect()
}

fn split_planes(fb: &FrameBuffer) -> [Vec<u8>; 3] {
    let mut rp = Vec::with_capacity(fb.pixels.len());
    let mut gp = Vec::with_capacity(fb.pixels.len());
    let mut bp = Vec::with_capacity(fb.pixels.len());
    for &px in &fb.pixels {
        let (r, g, b) = unpack(px);
        rp.push(r);
        gp.push(g);
        bp.push(b);
    }
    [rp, gp, bp]
}

fn grayscale(fb: &mut FrameBuffer) {
    for px in &mut fb.pixels {
        let (r, g, b) = unpack(*px);
        let l = luma(r, g, b);
        *px = pack(l, l, l);
    }
}

/// Hue in degrees [0,360), or 0 for achromatic pixels.
fn hue_deg(r: f32, g: f32, b: f32, max: f32, d: f32) -> f32 {
    if d == 0.0 {
        return 0.0;
    }
    let h = if max == r {
        60.0 * (g - b) / d
    } else if max == g {
        60.0 * (b - r) / d + 120.0
    } else {
        60.0 * (r - g) / d + 240.0
    };
    if h < 0.0 { h + 360.0 } else { h }
}

/// Show the HSV channels directly as R, G, B, hue halved into 0..180.
/// Visual: the familiar false-color view where hue paints the scene.
fn hsv(fb: &mut FrameBuffer) {
    for px in &mut fb.pixels {
        let (r, g, b) = unpack(*px);
        let (rf, gf, bf) = (r as f32, g as f32, b as f32);
        let max = rf.max(gf).max(bf);
        let min = rf.min(gf).min(bf);
        let d = max - min;

        let h = (hue_deg(rf, gf, bf, max, d) / 2.0) as u8;
        let s = if max == 0.0 { 0 } else { (d * 255.0 / max) as u8 };
        let v = max as u8;
        *px = pack(h, s, v);
    }
}

/// Same idea for HLS: channels H, L, S shown directly.
fn hls(fb: &mut FrameBuffer) {
    for px in &mut fb.pixels {
        let (r, g, b) = unpack(*px);
        let (rf, gf, bf) = (r as f32, g as f32, b as f32);
        let max = rf.max(gf).max(bf);
        let min = rf.min(gf).min(bf);
        let d = max - min;

        let h = (hue_deg(rf, gf, bf, max, d) / 2.0) as u8;
        let l = ((max + min) / 2.0) as u8;
        let s = if d == 0.0 {
            0
        } else if (l as f32) < 128.0 {
            (d * 255.0 / (max + min)) as u8
        } else {
            (d * 255.0 / (510.0 - max - min)) as u8
        };
        *px = pack(h, l, s);
    }
}

/// Median blur: each channel takes the median of its (2r+1)^2 window,
/// edges clamped. Kills speckle while keeping hard edges hard.
fn median_blur(fb: &mut FrameBuffer, radius: i32) {
    let (w, h) = (fb.width, fb.height);
    let planes = split_planes(fb);
    let blurred: Vec<Vec<u8>> = planes.iter().map(|p| median_plane(p, w, h, radius)).collect();
    for i in 0..w * h {
        fb.pixels[i] = pack(blurred[0][i], blurred[1][i], blurred[2][i]);
    }
}

fn median_plane(src: &[u8], w: usize, h: usize, radius: i32) -> Vec<u8> {
    let mut out = Vec::with_capacity(w * h);
    let win = (2 * radius + 1) * (2 * radius + 1);
    let mut window = Vec::with_capacity(win as usize);

    for y in 0..h as i32 {
        for x in 0..w as i32 {
            window.clear();
            for ky in -radius..=radius {
                let sy = (y + ky).clamp(0, h as i32 - 1) as usize;
                for kx in -radius..=radius {
                    let sx = (x + kx).clamp(0, w as i32 - 1) as usize;
                    window.push(src[sy * w + sx]);
                }
            }
            // Window is small; sorting it is cheap enough per pixel
            window.sort_unstable();
            out.push(window[window.len() / 2]);
        }
    }
    out
}

/// Sliding-window box mean over one channel plane, edges extended.
/// Two passes (horizontal then vertical) keep it O(1) per pixel.
fn box_mean_plane(src: &[u8], w: usize, h: usize, radius: usize) -> Vec<u8> {
    let win = (2 * radius + 1) as u32;

    // Pass 1: horizontal, rows averaged into tmp
    let mut tmp = vec![0u8; w * h];
    for y in 0..h {
        let row = y * w;
        let mut sum: u32 = src[row] as u32 * (radius as u32 + 1);
        for x in 1..=radius {
            sum += src[row + x.min(w - 1)] as u32;
        }
        for x in 0..w {
            tmp[row + x] = (sum / win) as u8;
            let left = x.saturating_sub(radius);
            let right = (x + radius + 1).min(w - 1);
            sum = sum + src[row + right] as u32 - src[row + left] as u32;
        }
    }

    // Pass 2: vertical, columns of tmp averaged into the result
    let mut out = vec![0u8; w * h];
    for x in 0..w {
        let mut sum: u32 = tmp[x] as u32 * (radius as u32 + 1);
        for y in 1..=radius {
            sum += tmp[y.min(h - 1) * w + x] as u32;
        }
        for y in 0..h {
            out[y * w + x] = (sum / win) as u8;
            let top = y.saturating_sub(radius);
            let bottom = (y + radius + 1).min(h - 1);
            sum = sum + tmp[bottom * w + x] as u32 - tmp[top * w + x] as u32;
        }
    }
    out
}

/// Classic global histogram equalization on the luma, shown as grayscale.
fn hist_equalize(fb: &mut FrameBuffer) {
    let gray = gray_plane(fb);

    let mut hist = [0u32; 256];
    for &g in &gray {
        hist[g as usize] += 1;
    }
    let mut cdf = [0u32; 256];
    let mut running = 0u32;
    for (bin, &count) in hist.iter().enumerate() {
        running += count;
        cdf[bin] = running;
    }

    let total = gray.len() as u32;
    let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0);
    let denom = total - cdf_min;
    if denom == 0 {
        return; // flat image, nothing to stretch
    }

    for (px, &g) in fb.pixels.iter_mut().zip(&gray) {
        let l = ((cdf[g as usize] - cdf_min) * 255 / denom) as u8;
        *px = pack(l, l, l);
    }
}

/// Cartoon look: flatten the colors with a box smooth, then black out
/// pixels that sit noticeably below their 9x9 neighborhood mean (the
/// pencil-line edges of an adaptive mean threshold).
fn cartoon(fb: &mut FrameBuffer) {
    const BLOCK_RADIUS: usize = 4; // 9x9 neighborhood
    const EDGE_BIAS: i32 = 9;

    let (w, h) = (fb.width, fb.height);
    let smooth_gray = median_plane(&gray_plane(fb), w, h, BLOCK_RADIUS as i32);
    let local_mean = box_mean_plane(&smooth_gray, w, h, BLOCK_RADIUS);

    let [rp, gp, bp] = split_planes(fb);
    let rs = box_mean_plane(&rp, w, h, BLOCK_RADIUS);
    let gs = box_mean_plane(&gp, w, h, BLOCK_RADIUS);
    let bs = box_mean_plane(&bp, w, h, BLOCK_RADIUS);

    for i in 0..w * h {
        let ink = (smooth_gray[i] as i32) <= (local_mean[i] as i32 - EDGE_BIAS);
        fb.pixels[i] = if ink { 0 } else { pack(rs[i], gs[i], bs[i]) };
    }
}
