pub mod extracted_deps;
