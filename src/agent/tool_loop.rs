//! Tool execution loop for AI-powered conversations.

use log::{debug, warn};

use crate::error::{BotError, Result};
use crate::openai::{ChatResult, Message};
use crate::tools::ToolExecutor;

use super::{ChatModel, ToolObserver};

const MAX_TOOL_ITERATIONS: usize = 5;

/// Run the tool execution loop, handling multiple rounds of tool calls.
///
/// Tool failures are reported back to the model as `Error: ...` results;
/// only model failures and the iteration limit end the loop with an error.
pub async fn run_tool_loop<M: ChatModel + ?Sized>(
    model: &M,
    tools: &ToolExecutor,
    conversation: &mut Vec<Message>,
    on_tool_start: Option<&dyn ToolObserver>,
) -> Result<String> {
    let definitions = tools.definitions();

    for _ in 0..MAX_TOOL_ITERATIONS {
        match model
            .complete(conversation.clone(), definitions.clone())
            .await?
        {
            ChatResult::TextResponse(text) => return Ok(text),
            ChatResult::ToolCalls {
                tool_calls,
                assistant_message,
            } => {
                debug!("Processing {} tool calls", tool_calls.len());
                conversation.push(assistant_message);

                for tool_call in tool_calls {
                    let name = &tool_call.function.name;
                    let arguments = &tool_call.function.arguments;

                    if let Some(observer) = on_tool_start {
                        observer.on_tool_start(name, arguments);
                    }

                    let result_text = match tools.execute(name, arguments).await {
                        Ok(output) => output,
                        Err(e) => {
                            warn!("Tool execution failed: {e}");
                            format!("Error: {e}")
                        }
                    };

                    conversation.push(Message::tool_result(tool_call.id, result_text));
                }
            }
        }
    }

    Err(BotError::ToolLoopLimit)
}
