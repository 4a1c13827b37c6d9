pub mod stamper;
