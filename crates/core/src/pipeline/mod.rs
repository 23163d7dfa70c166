pub mod recognize_faces_use_case;
