pub mod compound;
