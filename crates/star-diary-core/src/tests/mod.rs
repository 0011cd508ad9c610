mod audio;
mod entry;
