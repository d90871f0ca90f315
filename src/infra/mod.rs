pub mod wienerlinien;
