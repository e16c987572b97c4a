use serde::{Deserialize, Serialize};

use crate::models::{LngLat, Listing};
use crate::surface::MapSurface;

/// Padding around fitted bounds, in screen pixels.
pub const FIT_PADDING_PX: f64 = 50.0;
/// Upper zoom bound when fitting several points.
pub const FIT_MAX_ZOOM: f64 = 15.0;
/// Zoom used when every point sits at the same place.
pub const SINGLE_POINT_ZOOM: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lng: f64,
    pub max_lng: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    fn around(p: LngLat) -> Self {
        BoundingBox {
            min_lng: p.lng,
            max_lng: p.lng,
            min_lat: p.lat,
            max_lat: p.lat,
        }
    }

    fn extend(&mut self, p: LngLat) {
        self.min_lng = self.min_lng.min(p.lng);
        self.max_lng = self.max_lng.max(p.lng);
        self.min_lat = self.min_lat.min(p.lat);
        self.max_lat = self.max_lat.max(p.lat);
    }

    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.min_lng + self.max_lng) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// True when the box has no area on either axis, i.e. a single point.
    pub fn is_degenerate(&self) -> bool {
        self.min_lng == self.max_lng && self.min_lat == self.max_lat
    }

    pub fn contains(&self, p: LngLat) -> bool {
        (self.min_lng..=self.max_lng).contains(&p.lng) && (self.min_lat..=self.max_lat).contains(&p.lat)
    }

    /// `[[west, south], [east, north]]`, the order the mapping library expects.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.min_lng, self.min_lat], [self.max_lng, self.max_lat]]
    }
}

/// Smallest box enclosing every finite coordinate, `None` when there is none.
pub fn bounding_box<I>(points: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = LngLat>,
{
    points
        .into_iter()
        .filter(LngLat::is_finite)
        .fold(None, |acc: Option<BoundingBox>, p| match acc {
            None => Some(BoundingBox::around(p)),
            Some(mut bb) => {
                bb.extend(p);
                Some(bb)
            }
        })
}

/// What the camera should do to show a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitRequest {
    Bounds {
        bounds: BoundingBox,
        padding: f64,
        max_zoom: f64,
    },
    Center {
        center: LngLat,
        zoom: f64,
    },
}

pub fn fit_request<I>(points: I) -> Option<FitRequest>
where
    I: IntoIterator<Item = LngLat>,
{
    let bounds = bounding_box(points)?;
    if bounds.is_degenerate() {
        Some(FitRequest::Center {
            center: bounds.center(),
            zoom: SINGLE_POINT_ZOOM,
        })
    } else {
        Some(FitRequest::Bounds {
            bounds,
            padding: FIT_PADDING_PX,
            max_zoom: FIT_MAX_ZOOM,
        })
    }
}

/// Animate the camera onto the points. Leaves the camera alone when empty.
pub fn fit_view<S, I>(surface: &mut S, points: I) -> Option<FitRequest>
where
    S: MapSurface + ?Sized,
    I: IntoIterator<Item = LngLat>,
{
    let request = fit_request(points)?;
    match request {
        FitRequest::Bounds {
            bounds,
            padding,
            max_zoom,
        } => surface.fit_bounds(&bounds, padding, max_zoom),
        FitRequest::Center { center, zoom } => surface.fly_to(center, zoom),
    }
    Some(request)
}

pub fn fit_listings<'a, S, I>(surface: &mut S, listings: I) -> Option<FitRequest>
where
    S: MapSurface + ?Sized,
    I: IntoIterator<Item = &'a Listing>,
{
    fit_view(surface, listings.into_iter().map(Listing::coordinates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::testing::{FakeSurface, SurfaceCall};
    use proptest::prelude::*;

    #[test]
    fn test_bounding_box_two_points() {
        let bb = bounding_box([LngLat::new(10.0, 10.0), LngLat::new(20.0, 20.0)]).unwrap();
        assert_eq!(
            bb,
            BoundingBox {
                min_lng: 10.0,
                max_lng: 20.0,
                min_lat: 10.0,
                max_lat: 20.0
            }
        );
        assert_eq!(bb.corners(), [[10.0, 10.0], [20.0, 20.0]]);
    }

    #[test]
    fn test_bounding_box_empty() {
        assert!(bounding_box(Vec::<LngLat>::new()).is_none());
    }

    #[test]
    fn test_bounding_box_skips_non_finite() {
        let bb = bounding_box([LngLat::new(f64::NAN, 1.0), LngLat::new(3.0, 4.0)]).unwrap();
        assert!(bb.is_degenerate());
        assert_eq!(bb.center(), LngLat::new(3.0, 4.0));
    }

    #[test]
    fn test_single_point_uses_default_zoom() {
        match fit_request([LngLat::new(5.0, 6.0)]) {
            Some(FitRequest::Center { center, zoom }) => {
                assert_eq!(center, LngLat::new(5.0, 6.0));
                assert!(zoom.is_finite());
                assert_eq!(zoom, SINGLE_POINT_ZOOM);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_fit_view_empty_is_noop() {
        let mut surface = FakeSurface::new();
        assert!(fit_view(&mut surface, Vec::new()).is_none());
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn test_fit_view_requests_bounds() {
        let mut surface = FakeSurface::new();
        fit_view(&mut surface, [LngLat::new(0.0, 0.0), LngLat::new(2.0, 1.0)]);
        assert!(matches!(
            surface.calls.as_slice(),
            [SurfaceCall::FitBounds { padding, .. }] if *padding == FIT_PADDING_PX
        ));
    }

    proptest! {
        #[test]
        fn test_box_encloses_every_point(
            points in proptest::collection::vec((-180.0f64..=180.0, -90.0f64..=90.0), 1..40)
        ) {
            let pts: Vec<LngLat> = points.iter().map(|&(lng, lat)| LngLat::new(lng, lat)).collect();
            let bb = bounding_box(pts.iter().copied()).unwrap();
            for p in &pts {
                prop_assert!(bb.contains(*p));
            }
            prop_assert!(bb.min_lng <= bb.max_lng);
            prop_assert!(bb.min_lat <= bb.max_lat);
        }
    }
}
