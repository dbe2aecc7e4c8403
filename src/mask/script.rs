//! Recorded pointer gestures that can be replayed onto a stroke target

use super::renderer::StrokeTarget;
use crate::error::{EditError, Result};
use crate::types::Point;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One pointer-down … pointer-up gesture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedStroke {
    /// Brush diameter for this stroke; keeps the previous size when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brush_size: Option<u32>,

    /// Canvas positions as `[x, y]` pairs, in drag order
    pub points: Vec<[f32; 2]>,
}

/// A sequence of strokes in canvas coordinates
///
/// ```json
/// { "strokes": [ { "brush_size": 40, "points": [[10, 10], [200, 10]] } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrokeScript {
    pub strokes: Vec<ScriptedStroke>,
}

impl StrokeScript {
    /// Parse a script from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| EditError::invalid_input(format!("Invalid stroke script: {e}")))
    }

    /// Read a script from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref)
            .map_err(|e| EditError::file_io_error("read stroke script", path_ref, &e))?;
        Self::from_json_str(&content)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.iter().all(|s| s.points.is_empty())
    }

    /// Number of pointer positions across all strokes
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(|s| s.points.len()).sum()
    }

    /// Feed every stroke to `target` as begin / extend… / end
    pub fn replay<T: StrokeTarget + ?Sized>(&self, target: &mut T) {
        for stroke in &self.strokes {
            let mut points = stroke.points.iter().map(|&[x, y]| Point::new(x, y));
            let Some(first) = points.next() else {
                continue;
            };

            if let Some(size) = stroke.brush_size {
                target.set_brush_size(size);
            }

            target.begin_stroke(first);
            for point in points {
                target.extend_stroke(point);
            }
            target.end_stroke();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::MaskRenderer;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl StrokeTarget for Recorder {
        fn begin_stroke(&mut self, point: Point) {
            self.calls.push(format!("begin {} {}", point.x, point.y));
        }
        fn extend_stroke(&mut self, point: Point) {
            self.calls.push(format!("extend {} {}", point.x, point.y));
        }
        fn end_stroke(&mut self) {
            self.calls.push("end".to_string());
        }
        fn set_brush_size(&mut self, diameter: u32) -> u32 {
            self.calls.push(format!("brush {diameter}"));
            diameter
        }
    }

    #[test]
    fn test_parse_and_replay_order() {
        let script = StrokeScript::from_json_str(
            r#"{"strokes": [
                {"brush_size": 20, "points": [[1, 2], [3, 4], [5, 6]]},
                {"points": []},
                {"points": [[7, 8]]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(script.point_count(), 4);
        assert!(!script.is_empty());

        let mut recorder = Recorder::default();
        script.replay(&mut recorder);
        assert_eq!(
            recorder.calls,
            vec![
                "brush 20", "begin 1 2", "extend 3 4", "extend 5 6", "end", "begin 7 8", "end",
            ]
        );
    }

    #[test]
    fn test_invalid_script_is_input_error() {
        let err = StrokeScript::from_json_str(r#"{"strokes": [{"points": [[1]]}]}"#).unwrap_err();
        assert!(matches!(err, EditError::InvalidInput(_)));
    }

    #[test]
    fn test_replay_onto_renderer_paints() {
        let script = StrokeScript {
            strokes: vec![ScriptedStroke {
                brush_size: Some(10),
                points: vec![[5.0, 5.0], [25.0, 5.0]],
            }],
        };
        let mut renderer = MaskRenderer::default();
        renderer.resize(30, 10);
        script.replay(&mut renderer);

        assert_eq!(renderer.brush_size(), 10);
        let mask = renderer.export_mask().unwrap();
        assert!(mask.is_selected(15, 5));
    }
}
