//! Line-oriented chat loop

use crate::commands::CommandContext;
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use xinyu_core::{ChatRequest, ChatTurn, XinyuError};

const QUIT_COMMANDS: &[&str] = &["/quit", "/exit"];

pub async fn run_chat(ctx: &CommandContext, conversation: Option<String>) -> Result<()> {
    let store = ctx.open_store().await?;
    let service = ctx.chat_service(store.clone());
    let mut conversation_id = conversation;

    println!("心语小屋 · 输入消息开始聊天，/quit 退出");
    if ctx.orchestrator.candidates().is_empty() {
        println!("(未配置模型密钥，将使用本地回复)");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("你> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if QUIT_COMMANDS.contains(&line) {
            break;
        }

        let mut request = ChatRequest::new(line);
        request.conversation_id = conversation_id.clone();

        match service.handle_message(ctx.user_id(), request).await {
            Ok(turn) => {
                print_turn(&turn);
                conversation_id = Some(turn.conversation_id);
                ctx.save_store(&store).await?;
            }
            Err(e) => {
                eprintln!("{}", e);
                if ends_session(&e, &mut conversation_id) {
                    break;
                }
            }
        }
    }

    if let Some(id) = conversation_id {
        println!("对话已保存: {}", id);
    }
    Ok(())
}

/// An unknown conversation ends the session and leaves nothing to report as saved.
fn ends_session(error: &XinyuError, conversation_id: &mut Option<String>) -> bool {
    if matches!(error, XinyuError::NotFound(_)) {
        *conversation_id = None;
        return true;
    }
    false
}

fn print_turn(turn: &ChatTurn) {
    let analysis = &turn.emotion_analysis;
    println!("\n小屋> {}\n", turn.message);
    println!(
        "[情绪: {} · 强度 {}/10 · 信念: {}]\n",
        analysis.emotion, analysis.intensity, analysis.belief
    );
}
