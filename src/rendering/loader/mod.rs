//! Loaders call the parsers on already fetched bytes and pipe the results into the value types
//! ([`crate::rendering::image::DecodedSprite`], [`crate::rendering::animation::Animation`]).
pub mod bitmap_loader;
pub mod def_loader;
