//! 业务服务层

pub mod doc_generator;
