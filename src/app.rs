// The per-frame driver: hand landmarks in, overlays out.
// Holds the cross-frame state of the app (the active Mode, the draw board,
// the face counters) and wires the detectors to the feature modules.
// Modes switch the moment both tracked fingertips cover a menu box; there
// is no hold timer.

use crate::board::DrawBoard;
use crate::draw::{self, BLACK, BLUE, GREEN, MENU_INK, YELLOW};
use crate::face::FaceState;
use crate::filters::{self, Filter};
use crate::hands;
use crate::ml::{FaceMesh, HandTracker};
use crate::types::{FrameBuffer, Point, Region};

/// Flat landmark indices of the two tracked fingertips.
const TAP_FINGERTIP: usize = 8;     // index fingertip, the "pen"
const OPTION_FINGERTIP: usize = 12; // middle fingertip

/// Everything the app can be doing. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Home,
    Face,
    Hands,
    Draw,
    Filters,
    Hsv,
    Hls,
    Gray,
    Cartoon,
    HistEq,
    Blurry,
}

impl Mode {
    fn label(self) -> &'static str {
        match self {
            Mode::Home => "home",
            Mode::Face => "face",
            Mode::Hands => "hands",
            Mode::Draw => "draw",
            Mode::Filters => "filters",
            Mode::Hsv => "hsv",
            Mode::Hls => "hls",
            Mode::Gray => "gray",
            Mode::Cartoon => "cartoon",
            Mode::HistEq => "histeq",
            Mode::Blurry => "blurry",
        }
    }

    /// Modes that show the filter submenu instead of the home menu.
    fn in_filter_menu(self) -> bool {
        matches!(
            self,
            Mode::Filters | Mode::Hsv | Mode::Hls | Mode::Gray
                | Mode::Cartoon | Mode::HistEq | Mode::Blurry
        )
    }

    fn filter(self) -> Option<Filter> {
        match self {
            Mode::Hsv => Some(Filter::Hsv),
            Mode::Hls => Some(Filter::Hls),
            Mode::Gray => Some(Filter::Gray),
            Mode::Cartoon => Some(Filter::Cartoon),
            Mode::HistEq => Some(Filter::HistEq),
            Mode::Blurry => Some(Filter::Blurry),
            _ => None,
        }
    }
}

// The menu boxes sit along the right edge of a 640x480 frame. Each entry
// maps a hit region straight to the Mode it selects.
const HOME_MENU: [(Mode, Region); 5] = [
    (Mode::Home, Region::new(550, 20, 620, 90)),
    (Mode::Face, Region::new(550, 100, 620, 170)),
    (Mode::Hands, Region::new(550, 180, 620, 250)),
    (Mode::Draw, Region::new(550, 260, 620, 330)),
    (Mode::Filters, Region::new(550, 340, 620, 430)),
];

const FILTER_MENU: [(Mode, Region); 7] = [
    (Mode::Home, Region::new(550, 20, 620, 90)),
    (Mode::Hsv, Region::new(550, 100, 620, 150)),
    (Mode::Hls, Region::new(550, 160, 620, 210)),
    (Mode::Gray, Region::new(550, 220, 620, 270)),
    (Mode::Cartoon, Region::new(550, 280, 620, 330)),
    (Mode::HistEq, Region::new(550, 340, 620, 390)),
    (Mode::Blurry, Region::new(550, 400, 620, 450)),
];

pub struct VisionApp {
    hand_tracker: Option<HandTracker>,
    face_mesh: Option<FaceMesh>,
    board: DrawBoard,
    face: FaceState,
    mode: Mode,
}

impl VisionApp {
    pub fn new(hand_tracker: Option<HandTracker>, face_mesh: Option<FaceMesh>) -> Self {
        Self {
            hand_tracker,
            face_mesh,
            board: DrawBoard::new(),
            face: FaceState::new(),
            mode: Mode::Home,
        }
    }

    /// Process one mirrored camera frame in place: run the detectors, feed
    /// the state machines, composite every overlay.
    pub fn process(&mut self, frame: &mut FrameBuffer) {
        let detected = match &mut self.hand_tracker {
            Some(tracker) => tracker.detect(frame),
            None => Vec::new(),
        };
        let points: Vec<Point> = detected.iter().flat_map(|h| h.points).collect();
        self.advance(frame, &points);
    }

    // The whole per-frame update, with hand landmarks already extracted so
    // the state machine can also be driven without a camera or models.
    fn advance(&mut self, frame: &mut FrameBuffer, points: &[Point]) {
        let fingertips = match (points.get(TAP_FINGERTIP), points.get(OPTION_FINGERTIP)) {
            (Some(&tap), Some(&option)) => Some((tap, option)),
            _ => None,
        };

        if let Some((tap, option)) = fingertips {
            // Visual: a green dot rides the index fingertip, a yellow one
            // the middle fingertip, in every mode.
            draw::fill_circle(frame, tap, 2, GREEN);
            draw::fill_circle(frame, option, 2, YELLOW);

            self.steer(tap, option);

            match self.mode {
                Mode::Hands => hands::render_overlay(frame, points),
                Mode::Draw => self.board.update(tap, option),
                _ => {}
            }
        }

        // The board stays visible in draw mode even when no hand is found.
        if self.mode == Mode::Draw {
            self.board.render(frame, fingertips.is_some());
        }

        if self.mode == Mode::Face {
            let face_points = match &mut self.face_mesh {
                Some(mesh) => mesh.detect(frame),
                None => Vec::new(),
            };
            let summary = self.face.update(&face_points);
            self.face.render(frame, summary.as_ref());
        } else if let Some(filter) = self.mode.filter() {
            filters::apply(filter, frame);
            draw::fill_rect(frame, Region::new(20, 20, 180, 60), BLACK);
            let label = format!("Filter : {}", filter.label());
            draw::draw_text_5x7(frame, 28, 34, &label, GREEN);
        }

        self.render_menu(frame);
    }

    // Switch Mode when both fingertips sit strictly inside the same menu
    // box this frame. Which menu applies depends on the current category.
    fn steer(&mut self, tap: Point, option: Point) {
        for &(mode, region) in self.menu() {
            if region.contains(tap) && region.contains(option) && mode != self.mode {
                log::info!("mode -> {}", mode.label());
                self.mode = mode;
            }
        }
    }

    fn menu(&self) -> &'static [(Mode, Region)] {
        if self.mode.in_filter_menu() { &FILTER_MENU } else { &HOME_MENU }
    }

    fn render_menu(&self, frame: &mut FrameBuffer) {
        for &(mode, region) in self.menu() {
            draw::fill_rect(frame, region, BLACK);
            draw::draw_text_5x7(frame, region.min.x + 10, region.min.y + 28, mode.label(), MENU_INK);
        }
    }
}

/// FPS readout in the corner, drawn by the frame loop after `process`.
pub fn draw_fps(frame: &mut FrameBuffer, fps_text: &str) {
    draw::draw_text_5x7(frame, 400, 44, fps_text, BLUE);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> VisionApp {
        VisionApp::new(None, None)
    }

    fn frame() -> FrameBuffer {
        FrameBuffer { width: 640, height: 480, pixels: vec![0; 640 * 480] }
    }

    // A 21-point hand whose tracked fingertips both sit at `p`.
    fn hand_at(p: Point) -> Vec<Point> {
        let mut points = vec![Point::new(0, 0); 21];
        points[TAP_FINGERTIP] = p;
        points[OPTION_FINGERTIP] = p;
        points
    }

    #[test]
    fn starts_at_home() {
        assert_eq!(app().mode, Mode::Home);
    }

    #[test]
    fn both_fingertips_in_a_menu_box_switch_mode() {
        let mut app = app();
        let mut fb = frame();
        // Inside the home menu's draw box [[550,260],[620,330]]
        app.advance(&mut fb, &hand_at(Point::new(580, 300)));
        assert_eq!(app.mode, Mode::Draw);
    }

    #[test]
    fn a_single_fingertip_inside_does_not_switch() {
        let mut app = app();
        let mut fb = frame();
        let mut points = hand_at(Point::new(580, 300));
        points[OPTION_FINGERTIP] = Point::new(100, 300); // outside the menu
        app.advance(&mut fb, &points);
        assert_eq!(app.mode, Mode::Home);
    }

    #[test]
    fn fewer_than_two_fingertips_change_nothing() {
        let mut app = app();
        app.mode = Mode::Draw;
        let mut fb = frame();

        app.advance(&mut fb, &[]);
        app.advance(&mut fb, &[Point::new(580, 300); 5]);

        assert_eq!(app.mode, Mode::Draw);
        assert_eq!(app.board.history().len(), 1);
        assert!(app.board.history()[0].is_empty());
    }

    #[test]
    fn filter_category_reads_the_filter_menu() {
        let mut app = app();
        app.mode = Mode::Filters;
        let mut fb = frame();

        // (580,245) is inside the filter menu's gray box [[550,220],[620,270]]
        // and also inside the home menu's hands box; the category decides.
        app.advance(&mut fb, &hand_at(Point::new(580, 245)));
        assert_eq!(app.mode, Mode::Gray);
    }

    #[test]
    fn home_entry_of_the_submenu_leaves_the_filter_category() {
        let mut app = app();
        app.mode = Mode::Blurry;
        let mut fb = frame();

        app.advance(&mut fb, &hand_at(Point::new(580, 50)));
        assert_eq!(app.mode, Mode::Home);

        // Back on the home menu, the same spot still selects home
        app.advance(&mut fb, &hand_at(Point::new(580, 300)));
        assert_eq!(app.mode, Mode::Draw);
    }

    #[test]
    fn drawing_flows_through_the_board_in_draw_mode() {
        let mut app = app();
        app.mode = Mode::Draw;
        let mut fb = frame();

        for x in [100, 105, 110] {
            app.advance(&mut fb, &hand_at(Point::new(x, 100)));
        }

        assert_eq!(app.board.history().len(), 2);
        assert_eq!(app.board.history()[1].len(), 3);
    }

    #[test]
    fn board_is_untouched_outside_draw_mode() {
        let mut app = app();
        let mut fb = frame();
        app.advance(&mut fb, &hand_at(Point::new(100, 100)));
        assert_eq!(app.board.history().len(), 1);
    }
}
