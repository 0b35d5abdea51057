#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use slate_record as record;
pub use slate_serde as serde;
