//! Deduplication of decoded graphics.
//!
//! Whoever requests a specific image or animation first takes care of fetching and decoding it
//! (i.e. [`crate::rendering::loader`]) and gets it back behind an [`std::sync::Arc`]. The cache only
//! keeps a [`std::sync::Weak`] to it, keyed by a [`locator::GraphicsLocator`]: the physical
//! location plus the selected group, frame and owner color. As long as somebody holds the value,
//! further requests for the same key [`std::sync::Arc::clone()`] it; once every holder is gone the
//! entry expires and the next request decodes again.
//!
//! Variants (e.g. the same sprite recolored for a player) are derived from the base decode with
//! [`resolver::Resolver::get_transformed`], which mutates in place when the requester is the sole
//! owner and clones otherwise.
pub mod cache;
pub mod locator;
pub mod resolver;
