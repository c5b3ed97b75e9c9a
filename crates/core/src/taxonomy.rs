//! Fixed interest → tag-group table that drives tag suggestions in the UI.
//!
//! The table is a compile-time constant; there is no way to change it at
//! runtime.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::tag::TagCategory;
use crate::errors::DomainError;

/// Number of tags per group shown as a quick pick for an interest.
pub const PREVIEW_LIMIT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Interest {
    #[serde(rename = "자녀/육아")]
    Parenting,
    #[serde(rename = "운전")]
    Driving,
    #[serde(rename = "주택/부동산")]
    Housing,
    #[serde(rename = "반려동물")]
    Pets,
    #[serde(rename = "여행/레저")]
    TravelLeisure,
    #[serde(rename = "건강")]
    Health,
}

impl Interest {
    pub const ALL: [Interest; 6] = [
        Self::Parenting,
        Self::Driving,
        Self::Housing,
        Self::Pets,
        Self::TravelLeisure,
        Self::Health,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Parenting => "자녀/육아",
            Self::Driving => "운전",
            Self::Housing => "주택/부동산",
            Self::Pets => "반려동물",
            Self::TravelLeisure => "여행/레저",
            Self::Health => "건강",
        }
    }

    pub fn profile(self) -> &'static InterestProfile {
        match self {
            Self::Parenting => &PARENTING,
            Self::Driving => &DRIVING,
            Self::Housing => &HOUSING,
            Self::Pets => &PETS,
            Self::TravelLeisure => &TRAVEL_LEISURE,
            Self::Health => &HEALTH,
        }
    }
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Interest {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|interest| interest.label() == trimmed)
            .ok_or_else(|| DomainError::UnknownInterest(trimmed.to_string()))
    }
}

/// Tag groups owned by one interest.
#[derive(Debug, PartialEq, Eq)]
pub struct InterestProfile {
    pub who: &'static [&'static str],
    pub risk: &'static [&'static str],
    pub priority: &'static [&'static str],
    pub change: &'static [&'static str],
}

impl InterestProfile {
    pub fn group(&self, category: TagCategory) -> &'static [&'static str] {
        match category {
            TagCategory::Who => self.who,
            TagCategory::Risk => self.risk,
            TagCategory::Priority => self.priority,
            TagCategory::Change => self.change,
        }
    }
}

static PARENTING: InterestProfile = InterestProfile {
    who: &[
        "#우리_아이",
        "#자녀",
        "#태아",
        "#산모",
        "#가족",
        "#0세",
        "#15세",
        "#30세",
        "#만12세이하자녀",
    ],
    risk: &[
        "#학교폭력",
        "#학교폭력피해치료",
        "#선천이상",
        "#성장단계별보장",
        "#일상_생활책임",
        "#화상",
        "#골절",
        "#질병",
    ],
    priority: &["#성장단계별보장", "#폭넓은보장", "#납입면제", "#건강관리서비스", "#어린이할인특약"],
    change: &["#자녀입학", "#출산예정"],
};

static DRIVING: InterestProfile = InterestProfile {
    who: &[
        "#운전자",
        "#나",
        "#현대차_블루링크_가입고객",
        "#기아_커넥트_서비스_가입고객",
        "#제네시스_커넥티드_서비스_가입고객",
        "#KG_MOBILITY_인포콘_서비스_가입고객",
        "#르노코리아_서비스_가입고객",
        "#메르세데스벤츠_Mercedes_me_서비스_가입고객",
    ],
    risk: &[
        "#교통사고",
        "#자동차사고",
        "#자동차사고벌금",
        "#변호사선임비용",
        "#형사합의금",
        "#면허정지",
        "#면허취소",
        "#자동차사고처리지원금",
    ],
    priority: &[
        "#안전운전할인",
        "#블랙박스할인특약",
        "#커넥티드카할인특약",
        "#스마트안전운전UBI할인특약",
        "#첨단안전장치장착할인특약",
        "#Eco마일리지특약",
        "#대중교통이용할인특약",
    ],
    change: &["#신차출고"],
};

static HOUSING: InterestProfile = InterestProfile {
    who: &["#주택소유자", "#다주택자", "#가족"],
    risk: &["#화재", "#누수_화재", "#가전제품고장", "#일상_생활책임", "#배상책임", "#도난/파손"],
    priority: &["#폭넓은보장", "#가성비_보험료"],
    change: &["#이사", "#내집마련"],
};

static PETS: InterestProfile = InterestProfile {
    who: &["#반려견", "#반려묘"],
    risk: &[
        "#피부질환",
        "#구강질환",
        "#슬개골",
        "#배상책임",
        "#입원치료비",
        "#통원치료비",
        "#상해",
        "#질병",
    ],
    priority: &["#보험료할인", "#특정처치보장", "#특정약물치료보장", "#다빈도질병보상"],
    change: &["#반려동물입양"],
};

static TRAVEL_LEISURE: InterestProfile = InterestProfile {
    who: &["#나", "#가족"],
    risk: &["#상해", "#골절", "#화상", "#상해후유장해", "#배상책임", "#휴대품손해"],
    priority: &["#종합보장", "#가성비_보험료"],
    change: &[],
};

static HEALTH: InterestProfile = InterestProfile {
    who: &["#나", "#부모님", "#가족", "#40세", "#60세"],
    risk: &[
        "#암_중증질환",
        "#뇌혈관질환",
        "#심장질환",
        "#허혈심장질환",
        "#수술_입원비",
        "#진단비",
        "#치료비",
        "#항암약물치료",
        "#방사선치료",
        "#전이암",
        "#간병인사용",
        "#질병",
        "#3대질병",
        "#사망",
        "#후유장해",
        "#치매",
    ],
    priority: &[
        "#100세보장",
        "#간편가입",
        "#가성비_보험료",
        "#든든한_진단비",
        "#매년_주요치료비_지급",
        "#유병자도가입가능",
        "#종합보장",
        "#연금액_지급",
        "#노후준비",
    ],
    change: &["#유병자경력", "#건강검진예정", "#노후준비"],
};

/// Interest names in display order.
pub fn interests() -> Vec<&'static str> {
    Interest::ALL.into_iter().map(Interest::label).collect()
}

/// The first [`PREVIEW_LIMIT`] tags of every group of `interest`.
pub fn recommended_tags(interest: Interest) -> BTreeMap<TagCategory, Vec<&'static str>> {
    let profile = interest.profile();
    TagCategory::ALL
        .into_iter()
        .map(|category| {
            let group = profile.group(category);
            (category, group.iter().take(PREVIEW_LIMIT).copied().collect())
        })
        .collect()
}

/// Like [`recommended_tags`] but keyed by the interest label; unknown labels
/// yield an empty preview.
pub fn recommended_tags_for(label: &str) -> BTreeMap<TagCategory, Vec<&'static str>> {
    label.parse::<Interest>().map(recommended_tags).unwrap_or_default()
}

/// Sorted, de-duplicated union of one category's tags across every interest.
pub fn all_tags_by_category(category: TagCategory) -> Vec<&'static str> {
    Interest::ALL
        .into_iter()
        .flat_map(|interest| interest.profile().group(category).iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interests_are_listed_in_display_order() {
        assert_eq!(
            interests(),
            vec!["자녀/육아", "운전", "주택/부동산", "반려동물", "여행/레저", "건강"]
        );
    }

    #[test]
    fn preview_caps_each_group_at_four() {
        let preview = recommended_tags(Interest::Health);

        assert_eq!(preview.len(), 4);
        assert_eq!(
            preview[&TagCategory::Risk],
            vec!["#암_중증질환", "#뇌혈관질환", "#심장질환", "#허혈심장질환"]
        );
        assert_eq!(preview[&TagCategory::Change].len(), 3);
    }

    #[test]
    fn preview_keeps_empty_groups() {
        let preview = recommended_tags(Interest::TravelLeisure);
        assert_eq!(preview.get(&TagCategory::Change), Some(&Vec::new()));
    }

    #[test]
    fn unknown_interest_label_yields_empty_preview() {
        assert!(recommended_tags_for("골프").is_empty());
        assert_eq!(recommended_tags_for("운전")[&TagCategory::Change], vec!["#신차출고"]);
    }

    #[test]
    fn category_union_is_sorted_and_deduplicated() {
        let who = all_tags_by_category(TagCategory::Who);

        assert_eq!(who.iter().filter(|tag| **tag == "#가족").count(), 1);
        assert!(who.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(who.contains(&"#반려묘"));
    }

    #[test]
    fn interest_parses_from_label() {
        assert_eq!("반려동물".parse::<Interest>(), Ok(Interest::Pets));
        assert_eq!(
            "골프".parse::<Interest>(),
            Err(DomainError::UnknownInterest("골프".to_string()))
        );
    }
}
