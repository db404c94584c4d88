// Hand-mode overlay: skeleton rendering of the 21-landmark hand graph and
// a raised-finger count from landmark spread distances.

use crate::draw::{self, GREEN, PLUM, RED, WHITE};
use crate::ml::HAND_POINTS;
use crate::types::{FrameBuffer, Point, Region};

/// Per-hand landmark pairs whose spread marks a raised finger.
const FINGER_PAIRS: [(usize, usize); 5] = [(4, 9), (5, 8), (9, 12), (13, 16), (17, 20)];
/// A pair further apart than this many pixels counts as raised.
const SPREAD_DISTANCE: f32 = 50.0;

/// Bone segments of the 21-landmark hand graph.
const HAND_LINKS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),          // thumb
    (0, 5), (5, 6), (6, 7), (7, 8),          // index
    (5, 9), (9, 10), (10, 11), (11, 12),     // middle
    (9, 13), (13, 14), (14, 15), (15, 16),   // ring
    (13, 17), (17, 18), (18, 19), (19, 20),  // pinky
    (0, 17),                                 // palm edge
];

const BANNER: Region = Region::new(3, 3, 180, 40);

/// How many fingers are raised across up to two hands (second hand's
/// landmarks sit at offset 21 in the flat point list).
pub fn count_fingers(points: &[Point]) -> u32 {
    let mut raised = 0;
    if points.len() >= HAND_POINTS {
        raised += hand_raised(&points[..HAND_POINTS]);
    }
    if points.len() >= 2 * HAND_POINTS {
        raised += hand_raised(&points[HAND_POINTS..2 * HAND_POINTS]);
    }
    raised
}

fn hand_raised(hand: &[Point]) -> u32 {
    FINGER_PAIRS
        .iter()
        .filter(|&&(a, b)| hand[a].distance(hand[b]) > SPREAD_DISTANCE)
        .count() as u32
}

/// Visual: green bones and red landmark dots over each detected hand, with
/// a white banner counting raised fingers.
pub fn render_overlay(fb: &mut FrameBuffer, points: &[Point]) {
    for hand in points.chunks_exact(HAND_POINTS) {
        for &(a, b) in &HAND_LINKS {
            draw::draw_line(fb, hand[a].x, hand[a].y, hand[b].x, hand[b].y, GREEN);
        }
        for &p in hand {
            draw::fill_circle(fb, p, 2, RED);
        }
    }

    draw::fill_rect(fb, BANNER, WHITE);
    let label = format!("Fingers : {}", count_fingers(points));
    draw::draw_text_5x7(fb, 10, 14, &label, PLUM);
}

#[cfg(test)]
mod tests {
    use super::*;

    // One hand with every finger pair spread well past the threshold.
    fn open_hand() -> Vec<Point> {
        let mut hand = vec![Point::new(0, 0); HAND_POINTS];
        hand[4] = Point::new(0, 0);
        hand[9] = Point::new(100, 0);
        hand[12] = Point::new(200, 0);
        hand[5] = Point::new(0, 100);
        hand[8] = Point::new(100, 100);
        hand[13] = Point::new(0, 200);
        hand[16] = Point::new(100, 200);
        hand[17] = Point::new(0, 300);
        hand[20] = Point::new(100, 300);
        hand
    }

    #[test]
    fn fist_counts_zero() {
        let hand = vec![Point::new(50, 50); HAND_POINTS];
        assert_eq!(count_fingers(&hand), 0);
    }

    #[test]
    fn open_hand_counts_five() {
        assert_eq!(count_fingers(&open_hand()), 5);
    }

    #[test]
    fn two_open_hands_count_ten() {
        let mut points = open_hand();
        points.extend(open_hand());
        assert_eq!(count_fingers(&points), 10);
    }

    #[test]
    fn spread_must_exceed_the_threshold() {
        let mut hand = vec![Point::new(0, 0); HAND_POINTS];
        hand[5] = Point::new(0, 0);
        hand[8] = Point::new(50, 0); // exactly 50 px: not raised
        assert_eq!(count_fingers(&hand), 0);

        hand[8] = Point::new(51, 0);
        assert_eq!(count_fingers(&hand), 1);
    }

    #[test]
    fn no_hands_means_no_fingers() {
        assert_eq!(count_fingers(&[]), 0);
        assert_eq!(count_fingers(&[Point::new(1, 1); 10]), 0);
    }
}
