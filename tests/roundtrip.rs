//! Roundtrip (write-read) tests for supported LAS versions and attributes.

use lasfile::{Header, Point, Reader, Writer};
use std::io::Cursor;

pub fn roundtrip(header: Header, point: &Point, should_succeed: bool) {
    let mut writer = Writer::new(Cursor::new(Vec::new()), header).unwrap();
    if !should_succeed {
        assert!(writer.write_point(point).is_err());
        return;
    }
    writer.write_point(point).unwrap();
    writer.close().unwrap();
    let header = writer.header().clone();
    let mut reader = Reader::new(writer.into_inner().unwrap()).unwrap();
    assert_eq!(*point, reader.read_point().unwrap().unwrap());
    assert!(reader.read_point().unwrap().is_none());
    assert_eq!(header, *reader.header());
}

macro_rules! roundtrip_point {
    ($name:ident, $modify_point:expr) => {
        roundtrip_point!($name, $modify_point, 0);
    };
    ($name:ident, $modify_point:expr, $format:expr) => {
        #[test]
        fn $name() {
            use lasfile::{Header, Point, point::Format};

            let mut header = Header::default();
            header.set_version(super::version()).unwrap();
            header.set_point_format(Format::new($format).unwrap()).unwrap();
            let mut point = Point::default();
            $modify_point(&mut point);
            crate::roundtrip(header, &point, true);
        }
    };
}

macro_rules! roundtrip_header {
    ($name:ident, $modify_header:expr) => {
        roundtrip_header!($name, $modify_header, 0);
    };
    ($name:ident, $modify_header:expr, $min_version_minor:expr) => {
        #[test]
        fn $name() {
            use lasfile::{Header, Point, Version};

            let version = super::version();
            let should_succeed = version >= Version::new(1, $min_version_minor);
            let mut header = Header::default();
            header.set_version(version).unwrap();
            $modify_header(&mut header);
            crate::roundtrip(header, &Point::default(), should_succeed);
        }
    };
}

macro_rules! version {
    ($name:ident, $major:expr, $minor:expr) => {
        mod $name {
            use lasfile::Version;

            fn version() -> Version {
                Version::new($major, $minor)
            }

            mod point {
                use lasfile::{Color, point::ScanDirection};

                roundtrip_point!(xyz, |p: &mut Point| {
                    p.x = 1.;
                    p.y = 2.;
                    p.z = 3.;
                });
                roundtrip_point!(negative_xyz, |p: &mut Point| {
                    p.x = -1.5;
                    p.y = -2.25;
                    p.z = -3.;
                });
                roundtrip_point!(intensity, |p: &mut Point| p.intensity = 42);
                roundtrip_point!(return_number, |p: &mut Point| p.return_number = 2);
                roundtrip_point!(number_of_returns, |p: &mut Point| p.number_of_returns = 7);
                roundtrip_point!(scan_direction, |p: &mut Point| p.scan_direction =
                    ScanDirection::LeftToRight);
                roundtrip_point!(is_edge_of_flight_line, |p: &mut Point| p
                    .is_edge_of_flight_line =
                    true);
                roundtrip_point!(classification, |p: &mut Point| p.classification = 31);
                roundtrip_point!(is_synthetic, |p: &mut Point| p.is_synthetic = true);
                roundtrip_point!(is_key_point, |p: &mut Point| p.is_key_point = true);
                roundtrip_point!(is_withheld, |p: &mut Point| p.is_withheld = true);
                roundtrip_point!(scan_angle_rank, |p: &mut Point| p.scan_angle_rank = -90);
                roundtrip_point!(user_data, |p: &mut Point| p.user_data = 42);
                roundtrip_point!(point_source_id, |p: &mut Point| p.point_source_id = 42);
                roundtrip_point!(gps_time, |p: &mut Point| p.gps_time = 42., 1);
                roundtrip_point!(
                    color,
                    |p: &mut Point| p.color = Color {
                        red: 1,
                        green: 2,
                        blue: 3
                    },
                    2
                );
                roundtrip_point!(
                    gps_time_and_color,
                    |p: &mut Point| {
                        p.gps_time = -1e9;
                        p.color = Color::new(u16::MAX, 0, 7);
                    },
                    3
                );
            }

            mod header {
                use chrono::NaiveDate;
                use lasfile::{GpsTimeType, Vlr};
                use uuid::Uuid;

                roundtrip_header!(
                    file_source_id,
                    |h: &mut Header| h.set_file_source_id(42).unwrap(),
                    1
                );
                roundtrip_header!(
                    gps_time_type,
                    |h: &mut Header| h.set_gps_time_type(GpsTimeType::Standard).unwrap(),
                    2
                );
                roundtrip_header!(
                    has_synthetic_return_numbers,
                    |h: &mut Header| h.set_has_synthetic_return_numbers(true).unwrap(),
                    3
                );
                roundtrip_header!(guid, |h: &mut Header| h
                    .set_guid(Uuid::from_bytes([42; 16]))
                    .unwrap());
                roundtrip_header!(system_identifier, |h: &mut Header| h
                    .set_system_identifier("roundtrip test")
                    .unwrap());
                roundtrip_header!(generating_software, |h: &mut Header| h
                    .set_generating_software("roundtrip test")
                    .unwrap());
                roundtrip_header!(date, |h: &mut Header| h
                    .set_date(NaiveDate::from_ymd_opt(2017, 10, 30))
                    .unwrap());
                roundtrip_header!(no_date, |h: &mut Header| h.set_date(None).unwrap());
                roundtrip_header!(transforms, |h: &mut Header| {
                    h.set_scale(0.1, 0.1, 0.1).unwrap();
                    h.set_offset(-1., -1., -1.).unwrap();
                });
                roundtrip_header!(vlrs, |h: &mut Header| h
                    .vlrs_mut()
                    .append(Vlr {
                        user_id: "roundtrip".to_string(),
                        record_id: 42,
                        description: "a test vlr".to_string(),
                        data: vec![1, 2, 3],
                    })
                    .unwrap());
                roundtrip_header!(empty_vlr, |h: &mut Header| h
                    .vlrs_mut()
                    .append(Vlr::default())
                    .unwrap());
                roundtrip_header!(padding, |h: &mut Header| h
                    .set_padding(b"You probably shouldn't do this".to_vec())
                    .unwrap());
            }
        }
    };
}

version!(las_1_0, 1, 0);
version!(las_1_1, 1, 1);
version!(las_1_2, 1, 2);
version!(las_1_3, 1, 3);
version!(las_1_4, 1, 4);
