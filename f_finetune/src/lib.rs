//! Stage F: per-class train/val/test split of the QA subset and the
//! on-disk records the RL trainer reads.

pub mod materialize;
pub mod split;
