use std::path::{Path, PathBuf};

use crate::imaging::domain::grid_tiler::GridTiler;
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::recognition::domain::face_batches::chunk_face_ids;
use crate::recognition::domain::face_recognizer::{
    DetectedFace, FaceId, FaceRecognizer, GroupResult, IdentifyOptions, IdentifyResult,
};
use crate::shared::constants::IDENTIFY_BATCH_LIMIT;

/// A detected face together with the source image it was tiled from.
#[derive(Clone, Debug, PartialEq)]
pub struct LocatedFace {
    pub face: DetectedFace,
    pub source: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecognitionReport {
    pub faces: Vec<LocatedFace>,
    pub identifications: Vec<IdentifyResult>,
    pub grouping: GroupResult,
}

impl RecognitionReport {
    pub fn face_ids(&self) -> Vec<FaceId> {
        self.faces.iter().map(|f| f.face.face_id.clone()).collect()
    }
}

/// Batch recognition pipeline: load → tile → detect → identify → group.
///
/// Identify requests are split into chunks of at most
/// [`IDENTIFY_BATCH_LIMIT`] face ids; grouping runs once over every face.
pub struct RecognizeFacesUseCase {
    reader: Box<dyn ImageReader>,
    recognizer: Box<dyn FaceRecognizer>,
    tiler: GridTiler,
    identify_options: IdentifyOptions,
    composite_output: Option<(Box<dyn ImageWriter>, PathBuf)>,
}

impl RecognizeFacesUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        recognizer: Box<dyn FaceRecognizer>,
        tiler: GridTiler,
        identify_options: IdentifyOptions,
    ) -> Self {
        Self {
            reader,
            recognizer,
            tiler,
            identify_options,
            composite_output: None,
        }
    }

    /// Also writes every composite to `dir` as `composite_<n>.png`.
    pub fn with_composite_output(mut self, writer: Box<dyn ImageWriter>, dir: &Path) -> Self {
        self.composite_output = Some((writer, dir.to_path_buf()));
        self
    }

    pub fn execute(&self, paths: &[PathBuf]) -> Result<RecognitionReport, Box<dyn std::error::Error>> {
        if paths.is_empty() {
            return Err("No input images given".into());
        }

        let images = paths
            .iter()
            .map(|p| self.reader.read(p))
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("Loaded {} images", images.len());

        let composites = self.tiler.tile_all(&images)?;
        log::info!(
            "Tiled into {} composite(s) of {n}x{n}",
            composites.len(),
            n = self.tiler.grid_size()
        );

        let mut faces = Vec::new();
        for (index, composite) in composites.iter().enumerate() {
            if let Some((writer, dir)) = &self.composite_output {
                let path = dir.join(format!("composite_{}.png", index + 1));
                writer.write(&path, composite)?;
                log::info!("Composite written to {}", path.display());
            }

            let detected = self.recognizer.detect(composite)?;
            log::info!("Composite {}: {} faces detected", index + 1, detected.len());
            let offset = index * self.tiler.capacity();
            faces.extend(detected.into_iter().map(|face| self.locate(face, offset, paths)));
        }

        if faces.is_empty() {
            log::warn!("No faces detected; skipping identification and grouping");
            return Ok(RecognitionReport::default());
        }

        let face_ids: Vec<FaceId> = faces.iter().map(|f| f.face.face_id.clone()).collect();
        let mut identifications = Vec::with_capacity(face_ids.len());
        for chunk in chunk_face_ids(&face_ids, IDENTIFY_BATCH_LIMIT) {
            log::debug!("Identifying batch of {} faces", chunk.len());
            identifications.extend(self.recognizer.identify(chunk, &self.identify_options)?);
        }

        let grouping = self.recognizer.group(&face_ids)?;
        log::info!(
            "{} groups, {} ungrouped faces",
            grouping.groups.len(),
            grouping.messy_group.len()
        );

        Ok(RecognitionReport {
            faces,
            identifications,
            grouping,
        })
    }

    fn locate(&self, face: DetectedFace, offset: usize, paths: &[PathBuf]) -> LocatedFace {
        let tile_size = self.tiler.blank().width();
        let source = face
            .rectangle
            .grid_cell(tile_size, self.tiler.grid_size())
            .and_then(|cell| paths.get(offset + cell))
            .cloned();
        LocatedFace { face, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::domain::image_encoder::EncodeError;
    use crate::imaging::domain::image_reader::ImageLoadError;
    use crate::recognition::domain::face_api_error::FaceApiError;
    use crate::recognition::domain::face_recognizer::Candidate;
    use crate::shared::bitmap::Bitmap;
    use crate::shared::face_rectangle::FaceRectangle;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    const TILE: u32 = 10;

    // --- Stubs ---

    struct StubReader;

    impl ImageReader for StubReader {
        fn read(&self, path: &Path) -> Result<Bitmap, ImageLoadError> {
            if path.to_string_lossy().contains("missing") {
                return Err(ImageLoadError::Decode {
                    path: path.to_path_buf(),
                    source: image::ImageError::IoError(std::io::Error::from(
                        std::io::ErrorKind::NotFound,
                    )),
                });
            }
            Ok(Bitmap::filled(TILE, TILE, 0))
        }
    }

    #[derive(Default)]
    struct Calls {
        detected: Vec<(u32, u32)>,
        identify_batches: Vec<Vec<FaceId>>,
        grouped: Vec<Vec<FaceId>>,
    }

    struct StubRecognizer {
        detections: Mutex<VecDeque<Vec<DetectedFace>>>,
        calls: Arc<Mutex<Calls>>,
    }

    impl StubRecognizer {
        fn new(detections: Vec<Vec<DetectedFace>>) -> Self {
            Self {
                detections: Mutex::new(detections.into()),
                calls: Arc::new(Mutex::new(Calls::default())),
            }
        }
    }

    impl FaceRecognizer for StubRecognizer {
        fn detect(&self, image: &Bitmap) -> Result<Vec<DetectedFace>, FaceApiError> {
            self.calls.lock().unwrap().detected.push(image.dimensions());
            Ok(self.detections.lock().unwrap().pop_front().unwrap_or_default())
        }

        fn identify(
            &self,
            face_ids: &[FaceId],
            options: &IdentifyOptions,
        ) -> Result<Vec<IdentifyResult>, FaceApiError> {
            self.calls
                .lock()
                .unwrap()
                .identify_batches
                .push(face_ids.to_vec());
            Ok(face_ids
                .iter()
                .map(|id| IdentifyResult {
                    face_id: id.clone(),
                    candidates: vec![Candidate {
                        person_id: format!("person-{id}"),
                        confidence: options.confidence_threshold + 0.1,
                    }],
                })
                .collect())
        }

        fn group(&self, face_ids: &[FaceId]) -> Result<GroupResult, FaceApiError> {
            self.calls.lock().unwrap().grouped.push(face_ids.to_vec());
            Ok(GroupResult {
                groups: vec![face_ids.to_vec()],
                messy_group: vec![],
            })
        }
    }

    struct FailingRecognizer;

    impl FaceRecognizer for FailingRecognizer {
        fn detect(&self, _image: &Bitmap) -> Result<Vec<DetectedFace>, FaceApiError> {
            Err(FaceApiError::Status {
                status: reqwest::StatusCode::UNAUTHORIZED,
                message: "Access denied".into(),
            })
        }

        fn identify(
            &self,
            _face_ids: &[FaceId],
            _options: &IdentifyOptions,
        ) -> Result<Vec<IdentifyResult>, FaceApiError> {
            unreachable!("identify must not run after a failed detect")
        }

        fn group(&self, _face_ids: &[FaceId]) -> Result<GroupResult, FaceApiError> {
            unreachable!("group must not run after a failed detect")
        }
    }

    struct StubWriter {
        written: Arc<Mutex<Vec<(PathBuf, (u32, u32))>>>,
    }

    impl ImageWriter for StubWriter {
        fn write(&self, path: &Path, image: &Bitmap) -> Result<(), EncodeError> {
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), image.dimensions()));
            Ok(())
        }
    }

    // --- Helpers ---

    fn paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("img-{i}.png"))).collect()
    }

    /// A face centred in grid cell `cell` of a grid with `grid_size` columns.
    fn face_in_cell(id: &str, cell: usize, grid_size: usize) -> DetectedFace {
        let col = (cell % grid_size) as i32 * TILE as i32;
        let row = (cell / grid_size) as i32 * TILE as i32;
        DetectedFace {
            face_id: FaceId::new(id),
            rectangle: FaceRectangle::new(col + 2, row + 2, 6, 6),
        }
    }

    fn use_case(recognizer: StubRecognizer, grid_size: usize) -> RecognizeFacesUseCase {
        RecognizeFacesUseCase::new(
            Box::new(StubReader),
            Box::new(recognizer),
            GridTiler::new(grid_size, TILE).unwrap(),
            IdentifyOptions::new("lab"),
        )
    }

    // --- Tests ---

    #[test]
    fn test_identify_batches_of_ten_in_order() {
        let detections: Vec<DetectedFace> = (0..23)
            .map(|i| face_in_cell(&format!("f{i}"), i, 6))
            .collect();
        let recognizer = StubRecognizer::new(vec![detections]);
        let calls = recognizer.calls.clone();

        let report = use_case(recognizer, 6).execute(&paths(23)).unwrap();

        let calls = calls.lock().unwrap();
        let sizes: Vec<usize> = calls.identify_batches.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![10, 10, 3]);
        assert_eq!(calls.identify_batches.concat(), report.face_ids());

        let identified: Vec<FaceId> = report
            .identifications
            .iter()
            .map(|r| r.face_id.clone())
            .collect();
        assert_eq!(identified, report.face_ids());
    }

    #[test]
    fn test_group_called_once_with_all_faces() {
        let detections: Vec<DetectedFace> =
            (0..12).map(|i| face_in_cell(&format!("f{i}"), i, 4)).collect();
        let recognizer = StubRecognizer::new(vec![detections]);
        let calls = recognizer.calls.clone();

        let report = use_case(recognizer, 4).execute(&paths(12)).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.grouped.len(), 1);
        assert_eq!(calls.grouped[0].len(), 12);
        assert_eq!(report.grouping.groups[0], report.face_ids());
    }

    #[test]
    fn test_composite_dimensions_sent_to_detect() {
        let recognizer = StubRecognizer::new(vec![vec![face_in_cell("a", 0, 6)]]);
        let calls = recognizer.calls.clone();

        use_case(recognizer, 6).execute(&paths(6)).unwrap();

        assert_eq!(calls.lock().unwrap().detected, vec![(60, 60)]);
    }

    #[test]
    fn test_overflow_produces_multiple_composites() {
        let recognizer = StubRecognizer::new(vec![
            vec![face_in_cell("a", 3, 2)],
            vec![face_in_cell("b", 0, 2)],
        ]);
        let calls = recognizer.calls.clone();
        let inputs = paths(5);

        let report = use_case(recognizer, 2).execute(&inputs).unwrap();

        assert_eq!(calls.lock().unwrap().detected.len(), 2);
        assert_eq!(report.face_ids(), vec![FaceId::new("a"), FaceId::new("b")]);
        assert_eq!(report.faces[0].source.as_ref(), Some(&inputs[3]));
        assert_eq!(report.faces[1].source.as_ref(), Some(&inputs[4]));
    }

    #[test]
    fn test_face_in_blank_cell_has_no_source() {
        let recognizer = StubRecognizer::new(vec![vec![face_in_cell("ghost", 7, 3)]]);
        let report = use_case(recognizer, 3).execute(&paths(2)).unwrap();
        assert_eq!(report.faces[0].source, None);
    }

    #[test]
    fn test_no_faces_skips_identify_and_group() {
        let recognizer = StubRecognizer::new(vec![vec![]]);
        let calls = recognizer.calls.clone();

        let report = use_case(recognizer, 6).execute(&paths(3)).unwrap();

        assert_eq!(report, RecognitionReport::default());
        let calls = calls.lock().unwrap();
        assert!(calls.identify_batches.is_empty());
        assert!(calls.grouped.is_empty());
    }

    #[test]
    fn test_identify_options_forwarded() {
        let recognizer = StubRecognizer::new(vec![vec![face_in_cell("a", 0, 6)]]);
        let report = use_case(recognizer, 6).execute(&paths(1)).unwrap();
        let top = report.identifications[0].top_candidate().unwrap();
        assert!(top.confidence >= 0.65);
        assert_eq!(top.person_id, "person-a");
    }

    #[test]
    fn test_composites_written_when_configured() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let writer = StubWriter {
            written: written.clone(),
        };

        use_case(StubRecognizer::new(vec![]), 2)
            .with_composite_output(Box::new(writer), Path::new("debug"))
            .execute(&paths(5))
            .unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].0, PathBuf::from("debug/composite_1.png"));
        assert_eq!(written[1].0, PathBuf::from("debug/composite_2.png"));
        assert_eq!(written[1].1, (20, 20));
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(use_case(StubRecognizer::new(vec![]), 6).execute(&[]).is_err());
    }

    #[test]
    fn test_unreadable_image_aborts_before_detect() {
        let recognizer = StubRecognizer::new(vec![]);
        let calls = recognizer.calls.clone();
        let inputs = vec![PathBuf::from("ok.png"), PathBuf::from("missing.png")];

        let err = use_case(recognizer, 6).execute(&inputs).unwrap_err();

        assert!(err.to_string().contains("missing.png"));
        assert!(calls.lock().unwrap().detected.is_empty());
    }

    #[test]
    fn test_service_error_propagates() {
        let uc = RecognizeFacesUseCase::new(
            Box::new(StubReader),
            Box::new(FailingRecognizer),
            GridTiler::new(6, TILE).unwrap(),
            IdentifyOptions::new("lab"),
        );
        let err = uc.execute(&paths(1)).unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}
