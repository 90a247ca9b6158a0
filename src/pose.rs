use crate::error::Error;
use ndarray::ArrayView2;
use num_traits::ToPrimitive;
use std::{ops::Sub, str::FromStr};

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, num_derive::FromPrimitive, num_derive::ToPrimitive,
)]
pub enum KeypointKind {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

pub const NUM_KEYPOINTS: usize = 17;

impl KeypointKind {
    pub fn idx(self) -> Result<usize, Error> {
        self.to_usize().ok_or(Error::KeypointVariantToUSize(self))
    }

    /// The name the upstream pose model uses for this joint.
    pub fn name(self) -> &'static str {
        use KeypointKind::*;

        match self {
            Nose => "nose",
            LeftEye => "left_eye",
            RightEye => "right_eye",
            LeftEar => "left_ear",
            RightEar => "right_ear",
            LeftShoulder => "left_shoulder",
            RightShoulder => "right_shoulder",
            LeftElbow => "left_elbow",
            RightElbow => "right_elbow",
            LeftWrist => "left_wrist",
            RightWrist => "right_wrist",
            LeftHip => "left_hip",
            RightHip => "right_hip",
            LeftKnee => "left_knee",
            RightKnee => "right_knee",
            LeftAnkle => "left_ankle",
            RightAnkle => "right_ankle",
        }
    }
}

impl FromStr for KeypointKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use KeypointKind::*;

        Ok(match s {
            "nose" => Nose,
            "left_eye" => LeftEye,
            "right_eye" => RightEye,
            "left_ear" => LeftEar,
            "right_ear" => RightEar,
            "left_shoulder" => LeftShoulder,
            "right_shoulder" => RightShoulder,
            "left_elbow" => LeftElbow,
            "right_elbow" => RightElbow,
            "left_wrist" => LeftWrist,
            "right_wrist" => RightWrist,
            "left_hip" => LeftHip,
            "right_hip" => RightHip,
            "left_knee" => LeftKnee,
            "right_knee" => RightKnee,
            "left_ankle" => LeftAnkle,
            "right_ankle" => RightAnkle,
            _ => return Err(Error::UnknownKeypointName(s.to_owned())),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Sub for Point2D {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// The joints of a single detection, indexed by [`KeypointKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Keypoints([Option<Point2D>; NUM_KEYPOINTS]);

impl Keypoints {
    /// Build a keypoint table from a list of joint names and a parallel
    /// `[K, 2]` array of `(x, y)` coordinates.
    ///
    /// Names the model emits that are not in [`KeypointKind`] are skipped, and
    /// pairing stops at the shorter of the two inputs.
    pub fn from_named<S>(names: &[S], xy: ArrayView2<f64>) -> Result<Self, Error>
    where
        S: AsRef<str>,
    {
        let mut keypoints = Self::default();

        for (name, row) in names.iter().map(AsRef::as_ref).zip(xy.outer_iter()) {
            let kind = match name.parse::<KeypointKind>() {
                Ok(kind) => kind,
                Err(e) => {
                    tracing::trace!(message = "skipping keypoint", error = %e);
                    continue;
                }
            };
            if let (Some(&x), Some(&y)) = (row.get(0), row.get(1)) {
                keypoints.0[kind.idx()?] = Some(Point2D::new(x, y));
            }
        }

        Ok(keypoints)
    }

    pub fn get(&self, kind: KeypointKind) -> Option<Point2D> {
        kind.idx().ok().and_then(|i| self.0[i])
    }

    /// Hip, knee and ankle on the left side, if all three are present.
    pub fn left_knee_joints(&self) -> Option<(Point2D, Point2D, Point2D)> {
        Some((
            self.get(KeypointKind::LeftHip)?,
            self.get(KeypointKind::LeftKnee)?,
            self.get(KeypointKind::LeftAnkle)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use num_traits::FromPrimitive;

    mod keypoint_kind_tests {
        use super::*;

        #[test]
        fn index_round_trips_through_from_usize() {
            for i in 0..NUM_KEYPOINTS {
                let kind = KeypointKind::from_usize(i).unwrap();
                assert_eq!(kind.idx().unwrap(), i);
            }
            assert!(KeypointKind::from_usize(NUM_KEYPOINTS).is_none());
        }

        #[test]
        fn names_parse_back() {
            for i in 0..NUM_KEYPOINTS {
                let kind = KeypointKind::from_usize(i).unwrap();
                assert_eq!(kind.name().parse::<KeypointKind>().unwrap(), kind);
            }
        }

        #[test]
        fn unknown_name() {
            assert!(matches!(
                "left_toe".parse::<KeypointKind>(),
                Err(Error::UnknownKeypointName(name)) if name == "left_toe"
            ));
        }
    }

    mod keypoints_tests {
        use super::*;

        #[test]
        fn from_named_skips_unknown_names() {
            let names = ["left_hip", "tail", "left_knee", "left_ankle"];
            let xy = array![[1.0, 2.0], [9.0, 9.0], [3.0, 4.0], [5.0, 6.0]];
            let keypoints = Keypoints::from_named(&names, xy.view()).unwrap();

            assert_eq!(
                keypoints.left_knee_joints(),
                Some((
                    Point2D::new(1.0, 2.0),
                    Point2D::new(3.0, 4.0),
                    Point2D::new(5.0, 6.0)
                ))
            );
            assert_eq!(keypoints.get(KeypointKind::Nose), None);
        }

        #[test]
        fn missing_ankle() {
            let names = ["left_hip", "left_knee", "right_ankle"];
            let xy = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
            let keypoints = Keypoints::from_named(&names, xy.view()).unwrap();
            assert_eq!(keypoints.left_knee_joints(), None);
        }

        #[test]
        fn more_names_than_rows() {
            let names = ["left_hip", "left_knee", "left_ankle"];
            let xy = array![[1.0, 2.0], [3.0, 4.0]];
            let keypoints = Keypoints::from_named(&names, xy.view()).unwrap();
            assert_eq!(keypoints.get(KeypointKind::LeftKnee), Some(Point2D::new(3.0, 4.0)));
            assert_eq!(keypoints.left_knee_joints(), None);
        }
    }
}
