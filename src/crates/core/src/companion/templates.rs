//! Canned ABC-framed replies used when no remote model is reachable.

use crate::emotion::detect_family;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use xinyu_ai_adapters::ChatMessage;

const OPENER_FIRST_CONTACT: &str = "很高兴与您开始这次对话，";
const OPENER_CONTINUING: &str = "我记得我们之前聊过的内容，";

const GREETING_TRIGGERS: &[&str] = &["你好", "您好", "hello"];
const THANKS_TRIGGERS: &[&str] = &["谢谢", "感谢"];

/// Keyed by emotion family label; every body names its emotion.
const FAMILY_TEMPLATES: &[(&str, &str)] = &[
    (
        "焦虑",
        "我能感受到您现在的焦虑情绪 🌸

让我们用ABC理论来理解这种感受：

**A (激发事件)**：是什么具体的情况让您感到焦虑？
**B (信念系统)**：您内心可能在想\"如果……就糟了\"？
**C (情绪后果)**：这些想法自然地带来了焦虑感

焦虑其实是内心的保护机制，提醒我们关注重要的事情。先深呼吸一下，您愿意和我详细说说吗？💕",
    ),
    (
        "悲伤",
        "我深深感受到了您的难过 💙

悲伤是一种珍贵而必要的情绪，让我们用ABC理论来理解：

**A (激发事件)**：发生了什么让您心情沉重？
**B (信念系统)**：您是否觉得失去了什么珍贵的东西？
**C (情绪后果)**：这种失去感带来了深深的悲伤

悲伤帮助我们消化生命中的失去和变化。请慢慢和我分享，不着急 🌱",
    ),
    (
        "愤怒",
        "我理解您的愤怒情绪 🌿

愤怒往往在保护我们珍视的价值，让我们用ABC理论来探索：

**A (激发事件)**：什么事情触发了您的愤怒？
**B (信念系统)**：您是否觉得自己的原则或界限被侵犯了，认为对方\"绝对不应该\"这样做？
**C (情绪后果)**：这种不公平感激发了愤怒

愤怒告诉我们什么对自己真正重要。在这种情绪里，您最想守护的是什么？🌱",
    ),
    (
        "压力",
        "我感受到您承受的压力和疲惫 🌙

让我们用ABC理论来梳理一下：

**A (激发事件)**：最近是什么事情让您感到特别累？
**B (信念系统)**：您是否觉得\"必须\"把所有事情都做到完美？
**C (情绪后果)**：这种要求让压力越积越多

疲惫是身心在提醒我们需要休息。最近有给自己留一点温柔的时光吗？💕",
    ),
    (
        "孤独",
        "我听到了您内心的孤独感 💕 这种感受很真实，也很不容易。

用ABC理论来看：

**A (激发事件)**：是什么情况让您感到孤独？
**B (信念系统)**：您是否在想\"没人真正理解我\"或\"我总是一个人面对一切\"？
**C (情绪后果)**：这些想法让孤独感更深了

此刻我就在这里陪着您，愿意听您说任何话。您想从哪里开始聊起呢？🌸",
    ),
    (
        "困惑",
        "听起来您现在有些困惑和迷茫 ✨

让我们用ABC理论一起理一理：

**A (激发事件)**：是什么选择或情况让您拿不定主意？
**B (信念系统)**：您是否觉得\"一定要找到唯一正确的答案\"？
**C (情绪后果)**：这种对确定性的要求让困惑变得更沉重

困惑往往意味着您在认真对待这件事。我们可以先把各种可能性摊开来看看，好吗？🌿",
    ),
    (
        "快乐",
        "感受到您的快乐真是太好了！🌟

即使是积极情绪，ABC理论同样适用：

**A (激发事件)**：什么美好的事情发生了？
**B (信念系统)**：您对这件事有什么积极的想法，比如\"我做到了\"？
**C (情绪后果)**：这些想法带来了快乐和力量

了解支撑快乐的信念，能帮助我们在困难时重新找回这份状态。和我多分享一些吧！✨💕",
    ),
];

const GREETING_TEMPLATE: &str = "您好！我是心语小屋的AI情感陪伴助手 🌸 我会运用ABC理论陪您一起理解和管理情绪。

无论您现在感受如何，我都会用心倾听。今天有什么想聊的吗？💕";

const THANKS_TEMPLATE: &str = "不用客气 🌸 能陪伴您就是我最开心的事。

如果还有其他想分享的感受或困扰，我随时都在。每一种情绪都值得被倾听和理解 💕";

const GENERIC_TEMPLATES: &[&str] = &[
    "我能感受到您的情感波动 🌸 让我们一起来看看这个情况。根据ABC理论：您遇到的具体事件是什么？您当时的想法是什么？这些想法又如何影响了您的情绪？记住，改变想法就可以改变情绪 💕",
    "谢谢您与我分享这些 ✨ 让我们用ABC理论来梳理一下：A是发生的事件，B是您对这件事的看法和信念，C是由此产生的情绪。通常我们可以通过调整B来改善C。您觉得呢？🌸",
    "我听到了您内心的声音 💕 情绪是内心的信号，告诉我们什么对自己很重要。同样的事件（A）对不同的人会带来不同的情绪（C），关键在于我们如何理解这件事（B）。让我们一起探索您的想法吧 🌿",
    "感谢您的信任 🌸 每个人都会经历情绪的起伏，这很正常。ABC理论告诉我们，情绪反应往往不是事件直接造成的，而是来自我们对事件的解释和信念。我们可以一起学着识别和调整这些信念，您想试试吗？✨",
    "我很理解您现在的感受 💕 生活有时会带来挑战，但请记住，您并不孤单。通过改变对事件的看法（B），我们可以改变自己的情绪反应（C）。我们一起找找更温柔的视角吧 🌈",
];

/// Generates a user-facing reply without any network access.
///
/// Generic template selection draws from an injected random source so tests
/// can pin it with a seed.
pub struct TemplatedResponder {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl TemplatedResponder {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    pub fn generate(&self, user_message: &str, history: &[ChatMessage]) -> String {
        let opener = if history.is_empty() {
            OPENER_FIRST_CONTACT
        } else {
            OPENER_CONTINUING
        };
        format!("{}{}", opener, self.select_body(user_message))
    }

    fn select_body(&self, user_message: &str) -> &'static str {
        if let Some(body) = detect_family(user_message).and_then(|family| family_template(family.label))
        {
            return body;
        }

        let lowered = user_message.to_lowercase();
        if GREETING_TRIGGERS.iter().any(|t| lowered.contains(t)) {
            return GREETING_TEMPLATE;
        }
        if THANKS_TRIGGERS.iter().any(|t| lowered.contains(t)) {
            return THANKS_TEMPLATE;
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        GENERIC_TEMPLATES[rng.gen_range(0..GENERIC_TEMPLATES.len())]
    }
}

impl Default for TemplatedResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TemplatedResponder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplatedResponder").finish_non_exhaustive()
    }
}

fn family_template(label: &str) -> Option<&'static str> {
    FAMILY_TEMPLATES
        .iter()
        .find(|(family, _)| *family == label)
        .map(|(_, body)| *body)
}

#[cfg(test)]
mod tests {
    use super::{
        TemplatedResponder, FAMILY_TEMPLATES, GENERIC_TEMPLATES, GREETING_TEMPLATE,
        OPENER_CONTINUING, OPENER_FIRST_CONTACT, THANKS_TEMPLATE,
    };
    use crate::emotion::keywords::EMOTION_FAMILIES;
    use xinyu_ai_adapters::ChatMessage;

    #[test]
    fn every_family_has_a_template_naming_it() {
        for family in EMOTION_FAMILIES {
            let (_, body) = FAMILY_TEMPLATES
                .iter()
                .find(|(label, _)| *label == family.label)
                .unwrap_or_else(|| panic!("missing template for {}", family.label));
            assert!(body.contains(family.label), "template for {}", family.label);
        }
    }

    #[test]
    fn anxiety_reply_names_the_emotion() {
        let reply = TemplatedResponder::with_seed(1).generate("我今天很焦虑", &[]);
        assert!(reply.starts_with(OPENER_FIRST_CONTACT));
        assert!(reply.contains("焦虑"));
        assert!(reply.contains("**B (信念系统)**"));
    }

    #[test]
    fn opener_reflects_history() {
        let history = vec![ChatMessage::user("在吗"), ChatMessage::assistant("我在")];
        let reply = TemplatedResponder::with_seed(1).generate("工作好累", &history);
        assert!(reply.starts_with(OPENER_CONTINUING));
        assert!(reply.contains("压力"));
    }

    #[test]
    fn greeting_and_thanks_intents() {
        let responder = TemplatedResponder::with_seed(1);
        assert!(responder.generate("你好呀", &[]).ends_with(GREETING_TEMPLATE));
        assert!(responder.generate("Hello there", &[]).ends_with(GREETING_TEMPLATE));
        assert!(responder.generate("谢谢你的陪伴", &[]).ends_with(THANKS_TEMPLATE));
    }

    #[test]
    fn thanks_for_help_gets_thanks_template() {
        let reply = TemplatedResponder::with_seed(1).generate("谢谢你帮忙", &[]);
        assert!(reply.ends_with(THANKS_TEMPLATE));
        assert!(!reply.contains("压力"));
    }

    #[test]
    fn emotion_beats_greeting() {
        let reply = TemplatedResponder::with_seed(1).generate("你好，我很难过", &[]);
        assert!(reply.contains("悲伤"));
        assert!(!reply.ends_with(GREETING_TEMPLATE));
    }

    #[test]
    fn generic_selection_is_reproducible_with_a_seed() {
        let message = "今天去公园散步了";
        let first: Vec<String> = {
            let responder = TemplatedResponder::with_seed(42);
            (0..8).map(|_| responder.generate(message, &[])).collect()
        };
        let second: Vec<String> = {
            let responder = TemplatedResponder::with_seed(42);
            (0..8).map(|_| responder.generate(message, &[])).collect()
        };
        assert_eq!(first, second);

        for reply in &first {
            let body = reply
                .strip_prefix(OPENER_FIRST_CONTACT)
                .expect("first-contact opener");
            assert!(GENERIC_TEMPLATES.contains(&body));
        }
    }

    #[test]
    fn generic_selection_covers_the_pool() {
        let responder = TemplatedResponder::with_seed(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(responder.generate("随便聊聊", &[]));
        }
        assert_eq!(seen.len(), GENERIC_TEMPLATES.len());
    }
}
