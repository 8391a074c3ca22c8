//! On-disk sessions.

use lasfile::{
    Color, Error, Header, Mode, Point, Registry, Session, SessionOptions, SessionState, Vlr,
    crs::{SpatialReference, WktCrsService},
    point::Format,
};
use std::{path::PathBuf, sync::Arc};
use tempfile::TempDir;
use uuid::Uuid;

struct Fixture {
    dir: TempDir,
    options: SessionOptions,
}

impl Fixture {
    fn new() -> Fixture {
        Fixture {
            dir: TempDir::new().unwrap(),
            options: SessionOptions::default().with_registry(Registry::new()),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn open<H>(&self, name: &str, mode: Mode, header: H) -> Result<Session, Error>
    where
        H: Into<Option<Header>>,
    {
        Session::open_with_options(self.path(name), mode, header, self.options.clone())
    }
}

fn points(n: u32) -> Vec<Point> {
    (0..n)
        .map(|i| Point {
            x: f64::from(i),
            y: f64::from(i) * 2.,
            z: -f64::from(i),
            intensity: i as u16,
            return_number: (i % 3 + 1) as u8,
            number_of_returns: 3,
            gps_time: f64::from(i) * 0.5,
            color: Color::new(i as u16, 0, 0),
            ..Default::default()
        })
        .collect()
}

fn header(format: u8) -> Header {
    let mut header = Header::default();
    header.set_point_format(Format::new(format).unwrap()).unwrap();
    header
}

#[test]
fn write_twice_fails_until_closed() {
    let fixture = Fixture::new();
    let mut first = fixture.open("twice.las", Mode::Write, None).unwrap();
    assert!(matches!(
        fixture.open("twice.las", Mode::Write, None),
        Err(Error::FileAlreadyOpen(_))
    ));
    first.close().unwrap();
    let _second = fixture.open("twice.las", Mode::Write, None).unwrap();
}

#[test]
fn dropped_session_releases_path() {
    let fixture = Fixture::new();
    {
        let _session = fixture.open("dropped.las", Mode::Write, None).unwrap();
    }
    let _session = fixture.open("dropped.las", Mode::Write, None).unwrap();
}

#[test]
fn many_readers() {
    let fixture = Fixture::new();
    fixture.open("readers.las", Mode::Write, None).unwrap().close().unwrap();
    let a = fixture.open("readers.las", Mode::Read, None).unwrap();
    let b = fixture.open("readers.las", Mode::Read, None).unwrap();
    assert!(matches!(
        fixture.open("readers.las", Mode::Write, None),
        Err(Error::FileAlreadyOpen(_))
    ));
    drop(a);
    drop(b);
    let _ = fixture.open("readers.las", Mode::Write, None).unwrap();
}

#[test]
fn global_registry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("global.las");
    let mut session = Session::open(&path, Mode::Write, None).unwrap();
    assert!(Registry::global().is_open(&path));
    assert!(Session::open(&path, Mode::Write, None).is_err());
    session.close().unwrap();
    assert!(!Registry::global().is_open(&path));
}

#[test]
fn header_freezes_at_first_write() {
    let fixture = Fixture::new();
    let mut session = fixture.open("frozen.las", Mode::Write, None).unwrap();
    session.header_mut().unwrap().set_scale(0.5, 0.5, 0.5).unwrap();
    session.header_mut().unwrap().set_offset(100., 200., 300.).unwrap();
    session
        .header_mut()
        .unwrap()
        .set_point_format(Format::new(1).unwrap())
        .unwrap();
    session.write(&Point::default()).unwrap();
    assert!(matches!(session.header_mut(), Err(Error::HeaderFrozen)));
    assert!(matches!(
        session.set_header(Header::default()),
        Err(Error::HeaderFrozen)
    ));
    assert!(matches!(
        session.add_vlr(Vlr::default()),
        Err(Error::HeaderFrozen)
    ));
    session.close().unwrap();

    let session = fixture.open("frozen.las", Mode::Read, None).unwrap();
    let header = session.header().unwrap();
    assert_eq!(0.5, header.transforms().x.scale);
    assert_eq!(300., header.transforms().z.offset);
    assert_eq!(Format::new(1).unwrap(), header.point_format());
}

#[test]
fn header_cannot_be_swapped_after_first_write() {
    let fixture = Fixture::new();
    let mut session = fixture.open("swapped.las", Mode::Write, header(0)).unwrap();
    let first = Point {
        x: 1.,
        y: 2.,
        ..Default::default()
    };
    session.write(&first).unwrap();
    assert!(matches!(session.header_mut(), Err(Error::HeaderFrozen)));
    assert_eq!(
        SessionState::OpenForWrite { frozen: true },
        session.state()
    );
    assert!(
        session
            .write(&Point {
                color: Color::new(1, 2, 3),
                ..Default::default()
            })
            .is_err()
    );
    session.write(&Point::default()).unwrap();
    session.close().unwrap();

    let mut session = fixture.open("swapped.las", Mode::Read, None).unwrap();
    let header = session.header().unwrap();
    assert_eq!(Format::new(0).unwrap(), header.point_format());
    assert_eq!(2, header.number_of_points());
    assert_eq!(227 + 2 * 20, std::fs::metadata(session.path()).unwrap().len());
    assert_eq!(Some(first), session.read(None).unwrap());
    assert_eq!(Some(Point::default()), session.read(None).unwrap());
    assert_eq!(None, session.read(None).unwrap());
}

macro_rules! n_points {
    ($name:ident, $format:expr, $n:expr) => {
        #[test]
        fn $name() {
            let fixture = Fixture::new();
            let mut points = points($n);
            let format = Format::new($format).unwrap();
            for point in &mut points {
                if !format.has_gps_time() {
                    point.gps_time = 0.;
                }
                if !format.has_color() {
                    point.color = Color::default();
                }
            }
            let mut session = fixture
                .open("n_points.las", Mode::Write, header($format))
                .unwrap();
            for point in &points {
                session.write(point).unwrap();
            }
            session.close().unwrap();

            let mut session = fixture.open("n_points.las", Mode::Read, None).unwrap();
            assert_eq!(u64::from($n as u32), session.header().unwrap().number_of_points());
            let mut read = Vec::new();
            while let Some(point) = session.read(None).unwrap() {
                read.push(point);
            }
            assert_eq!(points, read);
        }
    };
}

n_points!(format_0_zero_points, 0, 0);
n_points!(format_0, 0, 100);
n_points!(format_1, 1, 100);
n_points!(format_2, 2, 100);
n_points!(format_3, 3, 1000);

#[test]
fn statistics_are_finalized() {
    let fixture = Fixture::new();
    let mut session = fixture.open("statistics.las", Mode::Write, header(0)).unwrap();
    for point in points(9) {
        session
            .write(&Point {
                gps_time: 0.,
                color: Color::default(),
                ..point
            })
            .unwrap();
    }
    assert_eq!(0, session.header().unwrap().number_of_points());
    session.close().unwrap();
    let session = fixture.open("statistics.las", Mode::Read, None).unwrap();
    let header = session.header().unwrap();
    assert_eq!(9, header.number_of_points());
    for return_number in 1..=3 {
        assert_eq!(3, header.number_of_points_by_return(return_number));
    }
    assert_eq!(0., header.bounds().min.x);
    assert_eq!(8., header.bounds().max.x);
    assert_eq!(16., header.bounds().max.y);
    assert_eq!(-8., header.bounds().min.z);
}

#[test]
fn vlr_offset() {
    let fixture = Fixture::new();
    let mut session = fixture.open("vlr.las", Mode::Write, None).unwrap();
    let vlr = Vlr {
        user_id: "lasfile".to_string(),
        record_id: 4242,
        description: "payload".to_string(),
        data: (0..=255).collect(),
    };
    session.add_vlr(vlr.clone()).unwrap();
    session.write(&Point::default()).unwrap();
    session.close().unwrap();

    let bytes = std::fs::read(fixture.path("vlr.las")).unwrap();
    let offset = u32::from_le_bytes([bytes[96], bytes[97], bytes[98], bytes[99]]);
    assert_eq!(227 + 54 + 256, offset);
    assert_eq!(offset as usize + 20, bytes.len());

    let session = fixture.open("vlr.las", Mode::Read, None).unwrap();
    assert_eq!(vec![vlr], session.vlrs().unwrap());
}

#[test]
fn random_access_matches_sequential() {
    let fixture = Fixture::new();
    let mut session = fixture.open("random.las", Mode::Write, header(3)).unwrap();
    for point in points(50) {
        session.write(&point).unwrap();
    }
    session.close().unwrap();

    let mut session = fixture.open("random.las", Mode::Read, None).unwrap();
    let mut sequential = Vec::new();
    while let Some(point) = session.read(None).unwrap() {
        sequential.push(point);
    }
    for index in [49, 0, 17, 33] {
        assert_eq!(sequential[index], session.read(index as u64).unwrap().unwrap());
    }
    assert!(session.read(None).unwrap().is_none());
    assert!(matches!(
        session.read(50_u64),
        Err(Error::IndexOutOfRange {
            index: 50,
            number_of_points: 50
        })
    ));
}

#[test]
fn guid() {
    let fixture = Fixture::new();
    let mut header = Header::default();
    let guid = Uuid::from_u128(0x8f14_e45f_ceea_467a_9a36_dedd_4bea_2543);
    header.set_guid(guid).unwrap();
    let mut session = fixture.open("guid.las", Mode::Write, header).unwrap();
    session.close().unwrap();

    let session = fixture.open("guid.las", Mode::Read, None).unwrap();
    let header = session.header().unwrap();
    assert_eq!(guid, header.guid());
    assert_eq!("8f14e45f-ceea-467a-9a36-dedd4bea2543", header.project_id());

    let mut session = fixture.open("guid.las", Mode::Write, None).unwrap();
    session
        .header_mut()
        .unwrap()
        .set_project_id("8F14E45F-CEEA-467A-9A36-DEDD4BEA2543")
        .unwrap();
    session.close().unwrap();
    let session = fixture.open("guid.las", Mode::Read, None).unwrap();
    assert_eq!(guid, session.header().unwrap().guid());
}

#[test]
fn close_is_idempotent() {
    let fixture = Fixture::new();
    let mut session = fixture.open("idempotent.las", Mode::Write, None).unwrap();
    session.write(&Point::default()).unwrap();
    session.close().unwrap();
    let len = std::fs::metadata(fixture.path("idempotent.las")).unwrap().len();
    session.close().unwrap();
    assert_eq!(SessionState::Closed, session.state());
    assert_eq!(
        len,
        std::fs::metadata(fixture.path("idempotent.las")).unwrap().len()
    );
}

#[test]
fn write_after_close() {
    let fixture = Fixture::new();
    let mut session = fixture.open("after_close.las", Mode::Write, None).unwrap();
    session.close().unwrap();
    assert!(matches!(
        session.write(&Point::default()),
        Err(Error::ClosedSession)
    ));
    let session = fixture.open("after_close.las", Mode::Read, None).unwrap();
    assert_eq!(0, session.header().unwrap().number_of_points());
}

#[test]
fn abandoned_session_leaves_stale_header() {
    let fixture = Fixture::new();
    {
        let mut session = fixture.open("stale.las", Mode::Write, None).unwrap();
        session.write(&Point { x: 1., ..Default::default() }).unwrap();
        session.write(&Point { x: 2., ..Default::default() }).unwrap();
    }
    let bytes = std::fs::read(fixture.path("stale.las")).unwrap();
    assert_eq!(227 + 2 * 20, bytes.len());
    let mut session = fixture.open("stale.las", Mode::Read, None).unwrap();
    assert_eq!(0, session.header().unwrap().number_of_points());
    assert!(session.read(None).unwrap().is_none());
}

#[test]
fn missing_file() {
    let fixture = Fixture::new();
    assert!(matches!(
        fixture.open("missing.las", Mode::Read, None),
        Err(Error::Io(_))
    ));
}

#[test]
fn crs_degrades_without_service() {
    let fixture = Fixture::new();
    let mut session = fixture.open("crs.las", Mode::Write, None).unwrap();
    session
        .add_vlr(Vlr::from(SpatialReference::wkt("GEOGCS[\"WGS 84\"]")))
        .unwrap();
    session.write(&Point::default()).unwrap();
    session.close().unwrap();

    let mut session = fixture.open("crs.las", Mode::Read, None).unwrap();
    assert_eq!(None, session.proj_string().unwrap());
    assert!(session.spatial_reference().unwrap().unwrap().is_wkt());
    assert_eq!(Point::default(), session.read(None).unwrap().unwrap());
}

#[test]
fn crs_service() {
    let fixture = Fixture::new();
    let options = fixture
        .options
        .clone()
        .with_crs_service(Arc::new(WktCrsService));
    let path = fixture.path("crs_service.las");
    let mut session = Session::open_with_options(&path, Mode::Write, None, options.clone()).unwrap();
    assert!(session.set_proj_string("PROJCS[\"a\"]").unwrap());
    assert!(session.set_proj_string("PROJCS[\"b\"]").unwrap());
    session.close().unwrap();

    let session = Session::open_with_options(&path, Mode::Read, None, options).unwrap();
    assert_eq!(
        Some("PROJCS[\"b\"]".to_string()),
        session.proj_string().unwrap()
    );
    assert_eq!(1, session.vlrs().unwrap().len());
}

#[test]
fn returned_copies_are_independent() {
    let fixture = Fixture::new();
    let mut session = fixture.open("copies.las", Mode::Write, None).unwrap();
    session.add_vlr(Vlr::default()).unwrap();
    let mut vlrs = session.vlrs().unwrap();
    vlrs[0].record_id = 42;
    vlrs.push(Vlr::default());
    assert_eq!(vec![Vlr::default()], session.vlrs().unwrap());

    let point = Point { x: 1., ..Default::default() };
    session.write(&point).unwrap();
    session.close().unwrap();
    let mut session = fixture.open("copies.las", Mode::Read, None).unwrap();
    let mut read = session.read(0_u64).unwrap().unwrap();
    read.x = 2.;
    assert_eq!(point, session.read(0_u64).unwrap().unwrap());
}
