mod engine;
mod geom;
mod misc;
mod scale;
