// Freehand drawing driven by a two-finger pinch.
// Visual: pinch index and middle fingertip together inside the drawing area
// and a cyan trace follows the index finger; release to lift the pen;
// cover the clear button with both fingertips and the board wipes.

use crate::draw::{self, BLUE, CYAN, DARK_GREEN, GREEN, RED, WHITE};
use crate::types::{FrameBuffer, Point, Region, Stroke};

/// Fingertips closer than this many pixels count as a pinch ("pen down").
pub const PINCH_DISTANCE: f32 = 30.0;

const DRAW_AREA: Region = Region::new(20, 50, 300, 250);
const CLEAR_BUTTON: Region = Region::new(20, 320, 120, 400);
const STATUS_BOX: Region = Region::new(10, 410, 150, 450);

pub struct DrawBoard {
    draw_area: Region,
    clear_button: Region,
    history: Vec<Stroke>,   // never empty; last entry grows during a pinch
    pinching: bool,
    was_pinching: bool,
}

impl DrawBoard {
    pub fn new() -> Self {
        Self {
            draw_area: DRAW_AREA,
            clear_button: CLEAR_BUTTON,
            history: vec![Stroke::new()],
            pinching: false,
            was_pinching: false,
        }
    }

    /// Advance the board by one frame of fingertip input. `tap` is the index
    /// fingertip (the pen), `option` the middle fingertip.
    ///
    /// The pinch state is recomputed from scratch every frame; each maximal
    /// pinching run inside the drawing area becomes exactly one stroke.
    pub fn update(&mut self, tap: Point, option: Point) {
        self.was_pinching = self.pinching;
        self.pinching = tap.distance(option) < PINCH_DISTANCE;

        if self.pinching && self.draw_area.contains(tap) {
            if self.was_pinching {
                // Continuing the pinch: extend the active stroke.
                if let Some(active) = self.history.last_mut() {
                    active.push(tap);
                }
            } else {
                // Fresh pinch: lift the pen and start a new stroke.
                self.history.push(vec![tap]);
            }
        }

        // Both fingertips over the clear button wipe everything, no undo.
        if self.clear_button.contains(tap) && self.clear_button.contains(option) {
            self.history = vec![Stroke::new()];
        }
    }

    /// Paint the board onto the frame: every stroke so far, the region
    /// outlines with their labels, and (when a hand is visible this frame)
    /// the pinch status box. Runs every frame whether or not `update` did.
    pub fn render(&self, fb: &mut FrameBuffer, hand_present: bool) {
        if hand_present {
            draw::fill_rect(fb, STATUS_BOX, WHITE);
            let (text, color) = if self.pinching {
                ("Drawing : ON", GREEN)
            } else {
                ("Drawing : Off", RED)
            };
            draw::draw_text_5x7(fb, 20, 424, text, color);
        }

        for stroke in self.history() {
            if stroke.len() >= 2 {
                draw::draw_polyline(fb, stroke, CYAN);
            }
        }

        draw::draw_rect(fb, self.draw_area, BLUE);
        draw::draw_text_5x7(fb, self.draw_area.min.x + 20, self.draw_area.min.y - 12, "Drawing Area", BLUE);

        draw::draw_rect(fb, self.clear_button, DARK_GREEN);
        draw::draw_text_5x7(fb, self.clear_button.min.x + 10, self.clear_button.min.y - 12, "Clear Button", DARK_GREEN);
    }

    pub fn history(&self) -> &[Stroke] {
        &self.history
    }
}

impl Default for DrawBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A pinched pair around `p`: the option finger 10 px away (< 30).
    fn pinched(p: Point) -> (Point, Point) {
        (p, Point::new(p.x + 10, p.y))
    }

    // An open pair: fingers 100 px apart (>= 30).
    fn open(p: Point) -> (Point, Point) {
        (p, Point::new(p.x + 100, p.y))
    }

    #[test]
    fn starts_with_one_empty_stroke() {
        let board = DrawBoard::new();
        assert_eq!(board.history(), &[Stroke::new()]);
    }

    #[test]
    fn pinching_run_becomes_one_stroke_in_order() {
        let mut board = DrawBoard::new();
        for p in [Point::new(100, 100), Point::new(105, 100), Point::new(110, 105)] {
            let (tap, option) = pinched(p);
            board.update(tap, option);
        }
        // The empty placeholder plus exactly one stroke with all three points
        assert_eq!(board.history().len(), 2);
        assert_eq!(
            board.history()[1],
            vec![Point::new(100, 100), Point::new(105, 100), Point::new(110, 105)]
        );
    }

    #[test]
    fn releasing_and_repinching_starts_a_new_stroke() {
        let mut board = DrawBoard::new();
        let (tap, option) = pinched(Point::new(100, 100));
        board.update(tap, option);
        let (tap, option) = pinched(Point::new(104, 100));
        board.update(tap, option);

        // Release: spread past the pinch threshold for one frame
        let (tap, option) = open(Point::new(108, 100));
        board.update(tap, option);
        let strokes_before = board.history().len();

        let (tap, option) = pinched(Point::new(112, 100));
        board.update(tap, option);

        assert_eq!(board.history().len(), strokes_before + 1);
        assert_eq!(board.history().last().unwrap(), &vec![Point::new(112, 100)]);
    }

    #[test]
    fn pinching_outside_the_draw_area_records_nothing() {
        let mut board = DrawBoard::new();
        let (tap, option) = pinched(Point::new(400, 400));
        board.update(tap, option);
        assert_eq!(board.history(), &[Stroke::new()]);
    }

    #[test]
    fn open_fingers_inside_the_area_record_nothing() {
        let mut board = DrawBoard::new();
        let (tap, option) = open(Point::new(100, 100));
        board.update(tap, option);
        assert_eq!(board.history(), &[Stroke::new()]);
    }

    #[test]
    fn clear_button_resets_history_unconditionally() {
        let mut board = DrawBoard::new();
        for p in [Point::new(100, 100), Point::new(105, 100)] {
            let (tap, option) = pinched(p);
            board.update(tap, option);
        }
        assert!(board.history().len() > 1);

        // Both fingertips on the clear button for a single frame
        board.update(Point::new(50, 350), Point::new(50, 350));
        assert_eq!(board.history(), &[Stroke::new()]);
    }

    #[test]
    fn one_fingertip_on_clear_is_not_enough() {
        let mut board = DrawBoard::new();
        let (tap, option) = pinched(Point::new(100, 100));
        board.update(tap, option);

        board.update(Point::new(50, 350), Point::new(400, 400));
        assert_eq!(board.history().len(), 2);
    }
}
