pub mod weak_dashmap;
