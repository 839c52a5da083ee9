//! Chart event index, playhead tracking and autoplay input synthesis for rhythm game charts.
//!
//! The crate consists of three layers built on a [`chart::Chart`]:
//!
//! - [`index`] provides [`index::OrderedIndex`], a row-ordered index over chart events with
//!   nearest-neighbor and range queries by row and by chart time. Because several rows can share
//!   one timestamp (warps), time queries locate an approximate cursor by row and then correct it
//!   with a short local walk (see [`index::walk`]).
//! - [`position`] provides [`position::PositionTracker`], which keeps song time, chart time and
//!   chart position consistent with each other and animates jumps between them.
//! - [`autoplay`] provides [`autoplay::AutoPlayer`], a per-lane state machine replaying the chart
//!   as synthesized presses and releases on a [`receptor::Receptor`].
//!
//! Timing (tempo, stops, warps) is abstracted by [`chart::timing::TimingSource`];
//! [`chart::timing::TempoMap`] is the bundled implementation.
//!
//! # Example
//!
//! ```
//! use stepchart::prelude::*;
//!
//! let timing = TempoMap::builder(48).bpm(0, 120.0).build()?;
//! let mut chart = Chart::new(4, timing);
//! chart.add_tap(48, 0)?;
//! chart.add_hold(96, 1, 192)?;
//!
//! let mut tracker = PositionTracker::new(InterpolationConfig::default());
//! tracker.set_chart_time(0.0, &chart);
//!
//! let mut autoplay = AutoPlayer::new(AutoPlayConfig::default());
//! let mut receptors = vec![RecordingReceptor::default(); chart.num_lanes()];
//! autoplay.update(&chart, tracker.position(), &mut receptors);
//!
//! tracker.set_chart_time(0.5, &chart);
//! autoplay.update(&chart, tracker.position(), &mut receptors);
//! assert_eq!(
//!     receptors[0].drain().collect::<Vec<_>>(),
//!     vec![ReceptorSignal::Down(0.0), ReceptorSignal::Up(0.0)],
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod autoplay;
pub mod chart;
pub mod index;
pub mod position;
pub mod prelude;
pub mod receptor;
pub mod util;
