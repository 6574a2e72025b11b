//! Contract interfaces read by the adapters.

use alloy::sol;

sol! {
    /// Aave V3 pool; Spark and Radiant expose the same account summary.
    interface IPool {
        function getUserAccountData(address user)
            external
            view
            returns (
                uint256 totalCollateralBase,
                uint256 totalDebtBase,
                uint256 availableBorrowsBase,
                uint256 currentLiquidationThreshold,
                uint256 ltv,
                uint256 healthFactor
            );
    }

    /// Compound V3 market, single-collateral view.
    interface IComet {
        function borrowBalanceOf(address account) external view returns (uint256);
        function collateralBalanceOf(address account) external view returns (uint256);
        function getPrice() external view returns (uint256);
    }
}
