// What you SEE now:
// • Live mirrored camera is always the base image, with a menu column on the right.
// • Cover a menu box with index + middle fingertip together to switch mode.
// • face: emotion / alignment / blink panel.  hands: skeleton + finger count.
// • draw: pinch to sketch inside the drawing area; both tips on the clear
//   button wipe it.  filters: a submenu of frame filters.  ESC quits.

mod app;
mod board;
mod camera;
mod draw;
mod error;
mod face;
mod filters;
mod hands;
mod ml;
mod types;

use std::time::{Duration, Instant};

use app::VisionApp;
use camera::CameraCapture;
use draw::Drawer;
use error::Error;

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    /* --- Camera + window setup ---
       Visual: window opens with the live camera feed. */
    let mut cam = CameraCapture::new(0, 640, 480)?;
    let (w, h) = cam.resolution();
    let mut drawer = Drawer::new("Smart Vision — Gesture Playground", w as usize, h as usize)?;

    /* --- Landmark models ---
       A missing model only disables its feature; the video keeps running. */
    let (hand_tracker, face_mesh) = ml::load_default();
    let mut vision = VisionApp::new(hand_tracker, face_mesh);

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS : 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Grab a fresh live frame and mirror it (selfie view). */
        let mut frame = cam.next_frame()?;
        filters::mirror(&mut frame);

        /* 2) Detect, steer, overlay: the whole app advances one frame here. */
        vision.process(&mut frame);

        /* 3) FPS readout on top, then present to the window. */
        app::draw_fps(&mut frame, &hud_fps_text);
        drawer.present(&frame)?;

        /* 4) FPS counter (updates the HUD once per second) */
        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            log::debug!("FPS: {fps:.1}");
            hud_fps_text = format!("FPS : {fps:.1}");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    Ok(())
}
