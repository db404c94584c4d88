// Landmark inference via ONNX Runtime.
// The models are opaque collaborators: hand in a frame, get back a fixed-size
// list of 2D keypoints (21 per hand, 468 per face) plus a presence score.
// Everything runs synchronously inside the frame loop; a missing model file
// simply disables that detector and the rest of the app keeps working.

use std::path::{Path, PathBuf};

use ndarray::Array4;
use ort::session::Session;
use ort::value::Tensor;

use crate::error::Error;
use crate::types::{FrameBuffer, Point};

/// Landmarks per detected hand.
pub const HAND_POINTS: usize = 21;
/// Landmarks per detected face mesh.
pub const FACE_POINTS: usize = 468;

const HAND_INPUT_SIDE: usize = 224;
const FACE_INPUT_SIDE: usize = 192;
const PRESENCE_THRESHOLD: f32 = 0.5;

/// One detected hand: 21 keypoints in frame pixel coordinates. Hands that
/// fail the model's presence score never make it out of the detector.
#[derive(Clone)]
pub struct Hand {
    pub points: [Point; HAND_POINTS],
}

/// Hand landmark model. `detect` returns zero hands or one full-frame hand;
/// the callers accept up to two per the landmark-source contract.
pub struct HandTracker {
    session: Session,
}

impl HandTracker {
    pub fn new(model_path: &Path) -> Result<Self, Error> {
        Ok(Self { session: load_session(model_path)? })
    }

    /// Run the model on the frame. Empty when no hand clears the score
    /// threshold; inference failures log a warning and count as no hand.
    pub fn detect(&mut self, frame: &FrameBuffer) -> Vec<Hand> {
        match self.infer(frame) {
            Ok(hands) => hands,
            Err(e) => {
                log::warn!("hand inference failed: {e}");
                Vec::new()
            }
        }
    }

    fn infer(&mut self, frame: &FrameBuffer) -> Result<Vec<Hand>, Error> {
        let input = tensor_from_frame(frame, HAND_INPUT_SIDE)?;
        let (landmarks, score) = run_landmark_model(&mut self.session, input)?;
        if score < PRESENCE_THRESHOLD || landmarks.len() < HAND_POINTS * 3 {
            return Ok(Vec::new());
        }

        let mut points = [Point::new(0, 0); HAND_POINTS];
        for (i, p) in points.iter_mut().enumerate() {
            *p = scale_to_frame(&landmarks[i * 3..], HAND_INPUT_SIDE, frame);
        }
        Ok(vec![Hand { points }])
    }
}

/// Face mesh model: 468 keypoints for the most prominent face, or none.
pub struct FaceMesh {
    session: Session,
}

impl FaceMesh {
    pub fn new(model_path: &Path) -> Result<Self, Error> {
        Ok(Self { session: load_session(model_path)? })
    }

    /// Run the model on the frame. Empty when no face is present.
    pub fn detect(&mut self, frame: &FrameBuffer) -> Vec<Point> {
        match self.infer(frame) {
            Ok(points) => points,
            Err(e) => {
                log::warn!("face inference failed: {e}");
                Vec::new()
            }
        }
    }

    fn infer(&mut self, frame: &FrameBuffer) -> Result<Vec<Point>, Error> {
        let input = tensor_from_frame(frame, FACE_INPUT_SIDE)?;
        let (landmarks, score) = run_landmark_model(&mut self.session, input)?;
        if score < PRESENCE_THRESHOLD || landmarks.len() < FACE_POINTS * 3 {
            return Ok(Vec::new());
        }

        let points = (0..FACE_POINTS)
            .map(|i| scale_to_frame(&landmarks[i * 3..], FACE_INPUT_SIDE, frame))
            .collect();
        Ok(points)
    }
}

/// Load both detectors from the models directory, disabling whatever is
/// missing. Visual: with no models at all the app still shows live video,
/// menus just never react.
pub fn load_default() -> (Option<HandTracker>, Option<FaceMesh>) {
    let Some(dir) = find_model_dir() else {
        log::warn!("models directory not found; landmark detection disabled");
        return (None, None);
    };
    log::info!("model directory: {}", dir.display());

    if let Err(e) = ort::init().with_name("smart-vision").commit() {
        log::warn!("ONNX Runtime init failed: {e}; landmark detection disabled");
        return (None, None);
    }

    let hands = match HandTracker::new(&dir.join("hand_landmark.onnx")) {
        Ok(t) => {
            log::info!("hand landmark model loaded");
            Some(t)
        }
        Err(e) => {
            log::warn!("{e}; hand tracking disabled");
            None
        }
    };
    let face = match FaceMesh::new(&dir.join("face_mesh.onnx")) {
        Ok(m) => {
            log::info!("face mesh model loaded");
            Some(m)
        }
        Err(e) => {
            log::warn!("{e}; face analysis disabled");
            None
        }
    };
    (hands, face)
}

/// Look for a `models/` directory next to the executable (including the
/// cargo target layouts) and in the working directory.
fn find_model_dir() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        let mut dir = exe.parent();
        while let Some(d) = dir {
            let candidate = d.join("models");
            if candidate.is_dir() {
                return Some(candidate);
            }
            dir = d.parent();
        }
    }
    let cwd = std::env::current_dir().ok()?;
    let candidate = cwd.join("models");
    candidate.is_dir().then_some(candidate)
}

fn load_session(path: &Path) -> Result<Session, Error> {
    Session::builder()
        .map_err(|e| Error::ModelLoad(format!("session builder: {e}")))?
        .with_intra_threads(2)
        .map_err(|e| Error::ModelLoad(format!("set threads: {e}")))?
        .commit_from_file(path)
        .map_err(|e| Error::ModelLoad(format!("load {}: {e}", path.display())))
}

/// Resize the frame to `side` x `side` and pack it as an NHWC float tensor
/// in [0,1], the layout these models expect.
fn tensor_from_frame(frame: &FrameBuffer, side: usize) -> Result<Array4<f32>, Error> {
    let mut data = vec![0.0f32; side * side * 3];
    let x_ratio = frame.width as f32 / side as f32;
    let y_ratio = frame.height as f32 / side as f32;

    for y in 0..side {
        for x in 0..side {
            let sx = ((x as f32 * x_ratio) as usize).min(frame.width - 1);
            let sy = ((y as f32 * y_ratio) as usize).min(frame.height - 1);
            let px = frame.pixels[sy * frame.width + sx];
            let out = (y * side + x) * 3;
            data[out] = ((px >> 16) & 0xFF) as f32 / 255.0;
            data[out + 1] = ((px >> 8) & 0xFF) as f32 / 255.0;
            data[out + 2] = (px & 0xFF) as f32 / 255.0;
        }
    }

    Array4::from_shape_vec((1, side, side, 3), data)
        .map_err(|e| Error::Inference(format!("input tensor shape: {e}")))
}

/// Run one landmark model and sort its outputs: the big tensor is the
/// landmark vector (x,y,z per point, in model-input pixels), the first
/// scalar is the presence logit.
fn run_landmark_model(
    session: &mut Session,
    input: Array4<f32>,
) -> Result<(Vec<f32>, f32), Error> {
    let tensor = Tensor::from_array(input)
        .map_err(|e| Error::Inference(format!("create tensor: {e}")))?;
    let outputs = session
        .run(ort::inputs![tensor])
        .map_err(|e| Error::Inference(format!("run session: {e}")))?;

    let mut landmarks = Vec::new();
    let mut score_logit = None;
    for (_name, value) in outputs.iter() {
        let (_shape, data) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Inference(format!("extract output: {e}")))?;
        if data.len() > 3 && landmarks.is_empty() {
            landmarks = data.to_vec();
        } else if data.len() == 1 && score_logit.is_none() {
            score_logit = Some(data[0]);
        }
    }

    let score = sigmoid(score_logit.ok_or_else(|| {
        Error::Inference("model produced no presence score".into())
    })?);
    Ok((landmarks, score))
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Map one (x,y,_z) triplet from model-input pixels to frame pixels.
fn scale_to_frame(triplet: &[f32], side: usize, frame: &FrameBuffer) -> Point {
    let x = triplet[0] / side as f32 * frame.width as f32;
    let y = triplet[1] / side as f32 * frame.height as f32;
    Point::new(x as i32, y as i32)
}
