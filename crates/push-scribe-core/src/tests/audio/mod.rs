mod capture;
mod chunk;
mod wav;
