pub mod rednote;
