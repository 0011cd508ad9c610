mod capture;
mod resampler;
mod wav;
