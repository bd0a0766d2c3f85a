/// One emotion label with its trigger substrings and the belief hypothesis
/// reported alongside it.
#[derive(Debug, PartialEq, Eq)]
pub struct EmotionFamily {
    pub label: &'static str,
    /// Lowercase substrings; any hit selects this family.
    pub triggers: &'static [&'static str],
    pub belief: &'static str,
}

pub const DEFAULT_EMOTION: &str = "混合情绪";
pub const DEFAULT_BELIEF: &str = "可能存在一些需要进一步探索的内在信念模式";

/// Scanned in order; the first family with a hit wins.
pub const EMOTION_FAMILIES: &[EmotionFamily] = &[
    EmotionFamily {
        label: "焦虑",
        triggers: &["焦虑", "紧张", "担心", "不安", "恐慌", "害怕", "忧虑"],
        belief: "可能存在对未来的过度担忧或对控制的强烈需求",
    },
    EmotionFamily {
        label: "悲伤",
        triggers: &[
            "难过", "伤心", "悲伤", "低落", "绝望", "沮丧", "失望", "痛苦", "失落",
        ],
        belief: "可能存在对失去的过度关注或自我价值感的质疑",
    },
    EmotionFamily {
        label: "愤怒",
        triggers: &["生气", "愤怒", "暴躁", "恼火", "愤恨", "气愤", "愤慨"],
        belief: "可能存在对公平的强烈期待或边界被侵犯的感受",
    },
    EmotionFamily {
        label: "压力",
        triggers: &["压力", "负担", "疲惫", "累", "忙碌", "疲劳", "紧迫"],
        belief: "可能存在对完美的过度追求或时间管理的挑战",
    },
    EmotionFamily {
        label: "孤独",
        triggers: &["孤独", "寂寞", "独自", "没人理解", "隔离", "孤单"],
        belief: "可能存在对连接的深度渴望或归属感的缺失",
    },
    EmotionFamily {
        label: "困惑",
        triggers: &["困惑", "迷茫", "不知道", "不确定", "疑惑", "纠结"],
        belief: "可能存在对确定性的强烈需求或决策困难",
    },
    EmotionFamily {
        label: "快乐",
        triggers: &["开心", "高兴", "快乐", "兴奋"],
        belief: "可能存在对自身努力的肯定或对美好事物的珍视",
    },
];

/// Case-insensitive substring scan in family priority order.
pub fn detect_family(text: &str) -> Option<&'static EmotionFamily> {
    let lowered = text.to_lowercase();
    EMOTION_FAMILIES.iter().find(|family| {
        family
            .triggers
            .iter()
            .any(|trigger| lowered.contains(trigger))
    })
}

/// Distinct triggers of `family` present in `text`.
pub fn matched_trigger_count(text: &str, family: &EmotionFamily) -> usize {
    let lowered = text.to_lowercase();
    family
        .triggers
        .iter()
        .filter(|trigger| lowered.contains(*trigger))
        .count()
}

#[cfg(test)]
mod tests {
    use super::{detect_family, matched_trigger_count, EMOTION_FAMILIES};

    #[test]
    fn every_trigger_selects_its_own_family() {
        for family in EMOTION_FAMILIES {
            for trigger in family.triggers {
                let text = format!("最近总是{}，不知所措", trigger);
                let detected = detect_family(&text).map(|f| f.label);
                // "不知所措" contains no trigger, so the hit comes from `trigger` alone.
                assert_eq!(detected, Some(family.label), "trigger {}", trigger);
            }
        }
    }

    #[test]
    fn triggers_are_stored_lowercase() {
        for family in EMOTION_FAMILIES {
            for trigger in family.triggers {
                assert_eq!(*trigger, trigger.to_lowercase());
            }
        }
    }

    #[test]
    fn asking_for_help_is_not_stress() {
        // "帮忙" shares a character with "忙碌" but is not a trigger.
        assert!(detect_family("谢谢你帮忙").is_none());
        assert_eq!(detect_family("最近太忙碌了").map(|f| f.label), Some("压力"));
    }

    #[test]
    fn earlier_family_wins_on_overlap() {
        assert_eq!(detect_family("难过得开心不起来").map(|f| f.label), Some("悲伤"));
        assert_eq!(detect_family("又累又担心").map(|f| f.label), Some("焦虑"));
    }

    #[test]
    fn no_trigger_means_no_family() {
        assert!(detect_family("今天吃了一碗面").is_none());
        assert!(detect_family("").is_none());
    }

    #[test]
    fn counts_distinct_triggers() {
        let family = detect_family("焦虑又紧张，还很担心").expect("anxious family");
        assert_eq!(matched_trigger_count("焦虑又紧张，还很担心", family), 3);
    }
}
