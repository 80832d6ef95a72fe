mod audio;
mod transcribe;
