//! Per-frame assignment of stable track ids to face detections.

use vmorph_models::{BoundingBox, FaceDetection, QualityMode};

use super::gallery::{EmbeddingGallery, DEFAULT_NOVELTY_THRESHOLD};

/// Weight of the best single-embedding similarity in the match score.
const MAX_SIM_WEIGHT: f32 = 0.7;
/// Weight of the mean similarity across the gallery.
const MEAN_SIM_WEIGHT: f32 = 0.3;
/// Weight of the track's smoothed quality in the match score.
const TRACK_QUALITY_WEIGHT: f32 = 0.1;
/// Fraction of the old quality kept when a track is matched.
const QUALITY_SMOOTHING: f32 = 0.8;

/// Matching thresholds and gallery sizing for a tracking session.
#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    /// Minimum embedding match score
    pub embed_threshold: f32,
    /// Minimum spatial (IoU-based) match score
    pub spatial_threshold: f32,
    /// Gallery novelty gate
    pub novelty_threshold: f32,
    /// Embeddings stored per track
    pub gallery_cap: usize,
}

impl TrackerConfig {
    /// Thresholds for a quality mode.
    pub fn for_mode(mode: QualityMode) -> Self {
        Self {
            embed_threshold: mode.embed_match_threshold(),
            spatial_threshold: mode.spatial_match_threshold(),
            novelty_threshold: DEFAULT_NOVELTY_THRESHOLD,
            gallery_cap: mode.gallery_cap(),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::for_mode(QualityMode::Balanced)
    }
}

/// One tracked identity.
#[derive(Debug, Clone)]
struct FaceTrack {
    id: u32,
    gallery: EmbeddingGallery,
    last_box: BoundingBox,
    quality: f32,
}

/// Assigns stable track ids to detections, frame by frame.
///
/// Tracks live for the whole session; ids are dense from 0 in creation
/// order. Assignment is deterministic: identical detection sequences
/// produce identical ids.
#[derive(Debug, Clone)]
pub struct TrackManager {
    tracks: Vec<FaceTrack>,
    next_id: u32,
    config: TrackerConfig,
}

impl TrackManager {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracks: Vec::new(),
            next_id: 0,
            config,
        }
    }

    /// Manager with the thresholds of a quality mode.
    pub fn for_mode(mode: QualityMode) -> Self {
        Self::new(TrackerConfig::for_mode(mode))
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Pre-register a track for a known identity before any frame is seen.
    ///
    /// The track has no position and zero quality, so it can only be
    /// claimed through embedding matching.
    pub fn seed(&mut self, embedding: Vec<f32>) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let mut gallery =
            EmbeddingGallery::new(self.config.gallery_cap, self.config.novelty_threshold);
        gallery.try_add(&embedding);
        self.tracks.push(FaceTrack {
            id,
            gallery,
            last_box: BoundingBox::new(0.0, 0.0, 0.0, 0.0),
            quality: 0.0,
        });
        id
    }

    /// Assign a track id to every detection of one frame.
    ///
    /// Returned ids are aligned with the input order. Within the frame each
    /// track is claimed at most once; unmatched detections open new tracks.
    pub fn assign(&mut self, detections: &[FaceDetection]) -> Vec<u32> {
        // Strongest detections claim tracks first: embeddings beat
        // detections without, then quality, then box area.
        let mut order: Vec<usize> = (0..detections.len()).collect();
        order.sort_by(|&i, &j| {
            let a = &detections[i];
            let b = &detections[j];
            b.has_embedding()
                .cmp(&a.has_embedding())
                .then(b.quality.total_cmp(&a.quality))
                .then(b.bbox.area().total_cmp(&a.bbox.area()))
                .then(i.cmp(&j))
        });

        let mut used = vec![false; self.tracks.len()];
        let mut assigned = vec![0u32; detections.len()];

        for &det_idx in &order {
            let det = &detections[det_idx];
            let matched = self
                .match_by_embedding(det, &used)
                .or_else(|| self.match_spatially(det, &used));

            let id = match matched {
                Some(track_idx) => {
                    used[track_idx] = true;
                    self.update_track(track_idx, det);
                    self.tracks[track_idx].id
                }
                None => {
                    let id = self.create_track(det);
                    used.push(true);
                    id
                }
            };
            assigned[det_idx] = id;
        }

        assigned
    }

    /// `(track_id, representative_embedding)` for every track that has one,
    /// in creation order.
    pub fn representatives(&self) -> Vec<(u32, Vec<f32>)> {
        self.tracks
            .iter()
            .filter_map(|t| t.gallery.representative().map(|e| (t.id, e.to_vec())))
            .collect()
    }

    fn match_by_embedding(&self, det: &FaceDetection, used: &[bool]) -> Option<usize> {
        let embedding = det.embedding.as_deref()?;
        let mut best: Option<(usize, f32)> = None;
        for (idx, track) in self.tracks.iter().enumerate() {
            if used[idx] {
                continue;
            }
            let Some(stats) = track.gallery.similarity_stats(embedding) else {
                continue;
            };
            let score = MAX_SIM_WEIGHT * stats.max
                + MEAN_SIM_WEIGHT * stats.mean
                + TRACK_QUALITY_WEIGHT * track.quality;
            if score >= self.config.embed_threshold
                && best.map_or(true, |(_, best_score)| score > best_score)
            {
                best = Some((idx, score));
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn match_spatially(&self, det: &FaceDetection, used: &[bool]) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, track) in self.tracks.iter().enumerate() {
            if used[idx] {
                continue;
            }
            let iou = track.last_box.iou(&det.bbox);
            if iou <= 0.0 {
                continue;
            }
            let score = iou * (0.5 + 0.5 * track.last_box.size_ratio(&det.bbox));
            if score >= self.config.spatial_threshold
                && best.map_or(true, |(_, best_score)| score > best_score)
            {
                best = Some((idx, score));
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn update_track(&mut self, track_idx: usize, det: &FaceDetection) {
        let track = &mut self.tracks[track_idx];
        track.last_box = det.bbox;
        track.quality =
            QUALITY_SMOOTHING * track.quality + (1.0 - QUALITY_SMOOTHING) * det.quality;
        if let Some(embedding) = &det.embedding {
            track.gallery.try_add(embedding);
        }
    }

    fn create_track(&mut self, det: &FaceDetection) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let mut gallery =
            EmbeddingGallery::new(self.config.gallery_cap, self.config.novelty_threshold);
        if let Some(embedding) = &det.embedding {
            gallery.try_add(embedding);
        }
        self.tracks.push(FaceTrack {
            id,
            gallery,
            last_box: det.bbox,
            quality: det.quality,
        });
        id
    }
}
