pub mod raster_normalizer;
