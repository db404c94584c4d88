// Face feature readouts from the 468-point mesh: eye blinks, mouth state,
// head alignment and a coarse emotion label. All thresholds are pixel
// distances between specific mesh landmarks at 640x480.

use crate::draw::{self, BLACK, WHITE};
use crate::ml::FACE_POINTS;
use crate::types::{FrameBuffer, Point, Region};

// Upper/lower eyelid landmark pairs used for blink and surprise detection.
const LEFT_EYE_GAP: (usize, usize) = (153, 158);
const RIGHT_EYE_GAP: (usize, usize) = (374, 386);
// Landmark chains tracing the upper and lower lip.
const UPPER_LIP_CHAIN: [usize; 11] = [76, 183, 42, 41, 38, 12, 268, 271, 272, 407, 306];
const LOWER_LIP_CHAIN: [usize; 11] = [76, 96, 89, 179, 86, 15, 316, 403, 319, 325, 306];
// Outer eye corners used for the head roll estimate.
const LEFT_EYE_CORNER: usize = 161;
const RIGHT_EYE_CORNER: usize = 388;

const EYE_CLOSED_DISTANCE: f32 = 7.0;
const EYE_WIDE_DISTANCE: f32 = 9.5;
const MOUTH_OPEN_DISTANCE: f32 = 15.0;
const ROLL_DELTA: i32 = 10;

const PANEL: Region = Region::new(20, 30, 230, 200);

/// Per-session face state. The blink counter and eyelid edge detector live
/// here explicitly so a frame update stays a plain method call.
pub struct FaceState {
    blink_count: u32,
    eyes_closed: bool,
    mouth_open: Option<bool>, // unknown until a face has been seen
}

/// What the analyzer read off the mesh this frame.
pub struct FaceSummary {
    pub emotion: &'static str,
    pub alignment: &'static str,
    pub angle: f32,
}

impl FaceState {
    pub fn new() -> Self {
        Self { blink_count: 0, eyes_closed: false, mouth_open: None }
    }

    /// Fold one frame of mesh points into the session state. Returns None
    /// (and changes nothing) when no full mesh was detected this frame.
    pub fn update(&mut self, points: &[Point]) -> Option<FaceSummary> {
        if points.len() < FACE_POINTS {
            return None;
        }

        self.track_blink(points);

        let mouth_open =
            points[12].distance(points[15]) > MOUTH_OPEN_DISTANCE;
        self.mouth_open = Some(mouth_open);

        let (alignment, angle) = read_alignment(points);
        let emotion = read_emotion(points, mouth_open);
        Some(FaceSummary { emotion, alignment, angle })
    }

    // Count the open-to-closed edge so a held blink increments once.
    fn track_blink(&mut self, points: &[Point]) {
        let closed = points[LEFT_EYE_GAP.0].distance(points[LEFT_EYE_GAP.1]) < EYE_CLOSED_DISTANCE
            && points[RIGHT_EYE_GAP.0].distance(points[RIGHT_EYE_GAP.1]) < EYE_CLOSED_DISTANCE;
        if closed && !self.eyes_closed {
            self.blink_count += 1;
        }
        self.eyes_closed = closed;
    }

    pub fn blink_count(&self) -> u32 {
        self.blink_count
    }

    /// Info panel for face mode. The per-frame readouts only show when a
    /// face was found; the session counters show regardless.
    pub fn render(&self, fb: &mut FrameBuffer, summary: Option<&FaceSummary>) {
        draw::fill_rect(fb, PANEL, WHITE);
        if let Some(s) = summary {
            draw::draw_text_5x7(fb, 30, 44, &format!("Emotion : {}", s.emotion), BLACK);
            draw::draw_text_5x7(fb, 30, 74, &format!("Alignment : {}", s.alignment), BLACK);
            draw::draw_text_5x7(fb, 30, 104, &format!("Align Angle : {:.2}", s.angle), BLACK);
        }
        draw::draw_text_5x7(fb, 30, 134, &format!("Blink : {}", self.blink_count()), BLACK);
        let mouth = match self.mouth_open {
            Some(true) => "True",
            Some(false) => "False",
            None => "None",
        };
        draw::draw_text_5x7(fb, 30, 164, &format!("Mouth Open : {mouth}"), BLACK);
    }
}

impl Default for FaceState {
    fn default() -> Self {
        Self::new()
    }
}

/// Head roll from the line between the outer eye corners: the vertical
/// delta picks the label, the signed angle against horizontal is reported.
fn read_alignment(points: &[Point]) -> (&'static str, f32) {
    let left = points[LEFT_EYE_CORNER];
    let right = points[RIGHT_EYE_CORNER];

    let v0 = ((right.x - left.x) as f32, 0.0f32); // horizontal reference
    let v1 = ((right.x - left.x) as f32, (right.y - left.y) as f32);
    let det = v0.0 * v1.1 - v0.1 * v1.0;
    let dot = v0.0 * v1.0 + v0.1 * v1.1;
    let angle = det.atan2(dot).to_degrees();

    let dy = right.y - left.y;
    let label = if dy > ROLL_DELTA {
        "right-rotated"
    } else if dy < -ROLL_DELTA {
        "left-rotated"
    } else {
        "straight"
    };
    (label, angle)
}

/// Coarse expression from eye and lip geometry: wide eyes over an open
/// mouth read as surprise; otherwise the mean segment length of the lower
/// lip chain against the upper one separates sad / normal / happy.
fn read_emotion(points: &[Point], mouth_open: bool) -> &'static str {
    if mouth_open {
        let left = points[LEFT_EYE_GAP.0].distance(points[LEFT_EYE_GAP.1]);
        let right = points[RIGHT_EYE_GAP.0].distance(points[RIGHT_EYE_GAP.1]);
        if left > EYE_WIDE_DISTANCE && right > EYE_WIDE_DISTANCE {
            "surprise"
        } else {
            "None"
        }
    } else {
        let upper = chain_mean_segment(points, &UPPER_LIP_CHAIN);
        let lower = chain_mean_segment(points, &LOWER_LIP_CHAIN);
        let diff = lower - upper;
        if diff < -0.10 {
            "sad"
        } else if diff < 0.015 {
            "normal"
        } else {
            "happy"
        }
    }
}

fn chain_mean_segment(points: &[Point], chain: &[usize]) -> f32 {
    let total: f32 = chain
        .windows(2)
        .map(|pair| points[pair[0]].distance(points[pair[1]]))
        .sum();
    total / (chain.len() - 1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    // A full mesh with every landmark at the origin, then opened eyes so
    // the blink detector stays quiet unless a test closes them.
    fn mesh() -> Vec<Point> {
        let mut points = vec![Point::new(0, 0); FACE_POINTS];
        open_eyes(&mut points);
        points
    }

    fn open_eyes(points: &mut [Point]) {
        points[LEFT_EYE_GAP.0] = Point::new(0, 0);
        points[LEFT_EYE_GAP.1] = Point::new(0, 10);
        points[RIGHT_EYE_GAP.0] = Point::new(40, 0);
        points[RIGHT_EYE_GAP.1] = Point::new(40, 10);
    }

    fn close_eyes(points: &mut [Point]) {
        points[LEFT_EYE_GAP.1] = points[LEFT_EYE_GAP.0];
        points[RIGHT_EYE_GAP.1] = points[RIGHT_EYE_GAP.0];
    }

    #[test]
    fn short_point_list_changes_nothing() {
        let mut face = FaceState::new();
        assert!(face.update(&[Point::new(1, 2); 10]).is_none());
        assert_eq!(face.blink_count(), 0);
        assert!(face.mouth_open.is_none());
    }

    #[test]
    fn blink_counts_the_closing_edge_only() {
        let mut face = FaceState::new();
        let mut points = mesh();

        face.update(&points);
        assert_eq!(face.blink_count(), 0);

        close_eyes(&mut points);
        face.update(&points);
        face.update(&points); // still closed, no second count
        assert_eq!(face.blink_count(), 1);

        open_eyes(&mut points);
        face.update(&points);
        close_eyes(&mut points);
        face.update(&points);
        assert_eq!(face.blink_count(), 2);
    }

    #[test]
    fn mouth_open_follows_the_lip_gap() {
        let mut face = FaceState::new();
        let mut points = mesh();

        points[12] = Point::new(100, 100);
        points[15] = Point::new(100, 120); // 20 px gap
        face.update(&points);
        assert_eq!(face.mouth_open, Some(true));

        points[15] = Point::new(100, 110); // 10 px gap
        face.update(&points);
        assert_eq!(face.mouth_open, Some(false));
    }

    #[test]
    fn wide_eyes_over_an_open_mouth_read_surprise() {
        let mut points = mesh(); // eye gaps are 10 px, past the 9.5 wide mark
        points[12] = Point::new(100, 100);
        points[15] = Point::new(100, 120);
        assert_eq!(read_emotion(&points, true), "surprise");

        // Same mouth but ordinary eye openings: no call either way
        points[LEFT_EYE_GAP.1] = Point::new(0, 8);
        points[RIGHT_EYE_GAP.1] = Point::new(40, 8);
        assert_eq!(read_emotion(&points, true), "None");
    }

    // Lip chain helpers: park one chain's interior on a single spot (mean
    // segment length 0) and walk the other along x so its mean is ~1.8.
    fn spread_chain(points: &mut [Point], chain: &[usize]) {
        for (i, &idx) in chain.iter().enumerate() {
            points[idx] = Point::new(100 + i as i32, 100);
        }
        points[chain[chain.len() - 1]] = Point::new(100, 100); // shared corner
    }

    fn collapse_chain(points: &mut [Point], chain: &[usize]) {
        for &idx in chain {
            points[idx] = Point::new(100, 100);
        }
    }

    #[test]
    fn lip_chain_difference_separates_happy_sad_normal() {
        let mut points = mesh();
        collapse_chain(&mut points, &UPPER_LIP_CHAIN);
        spread_chain(&mut points, &LOWER_LIP_CHAIN);
        assert_eq!(read_emotion(&points, false), "happy");

        let mut points = mesh();
        spread_chain(&mut points, &UPPER_LIP_CHAIN);
        collapse_chain(&mut points, &LOWER_LIP_CHAIN);
        assert_eq!(read_emotion(&points, false), "sad");

        let mut points = mesh();
        collapse_chain(&mut points, &UPPER_LIP_CHAIN);
        collapse_chain(&mut points, &LOWER_LIP_CHAIN);
        assert_eq!(read_emotion(&points, false), "normal");
    }

    #[test]
    fn alignment_follows_the_eye_line() {
        let mut points = mesh();
        points[LEFT_EYE_CORNER] = Point::new(100, 100);

        points[RIGHT_EYE_CORNER] = Point::new(200, 100);
        let (label, angle) = read_alignment(&points);
        assert_eq!(label, "straight");
        assert_eq!(angle, 0.0);

        points[RIGHT_EYE_CORNER] = Point::new(200, 120);
        let (label, angle) = read_alignment(&points);
        assert_eq!(label, "right-rotated");
        assert!(angle > 0.0);

        points[RIGHT_EYE_CORNER] = Point::new(200, 80);
        let (label, angle) = read_alignment(&points);
        assert_eq!(label, "left-rotated");
        assert!(angle < 0.0);
    }
}
