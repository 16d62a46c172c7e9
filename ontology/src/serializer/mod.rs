//! Serializers for model terms.

pub mod turtle;
